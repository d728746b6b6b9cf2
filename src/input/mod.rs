//! Input event model and evdev classification.

pub mod discovery;
pub mod supervisor;

use evdev::{InputEvent, InputEventKind, Key, RelativeAxisType};

/// Decoded input event consumed by the translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEvent {
    /// Relative horizontal motion, raw device units.
    MotionX(i32),
    /// Relative vertical motion, raw device units.
    MotionY(i32),
    Button { button: MouseButton, pressed: bool },
    /// Synchronization marker, produces no output.
    Sync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

/// Classifies a raw evdev event; anything the bridge does not handle maps
/// to `None`.
pub fn classify(event: &InputEvent) -> Option<MouseEvent> {
    match event.kind() {
        InputEventKind::RelAxis(RelativeAxisType::REL_X) => {
            Some(MouseEvent::MotionX(event.value()))
        }
        InputEventKind::RelAxis(RelativeAxisType::REL_Y) => {
            Some(MouseEvent::MotionY(event.value()))
        }
        InputEventKind::Key(Key::BTN_LEFT) => Some(MouseEvent::Button {
            button: MouseButton::Left,
            pressed: event.value() != 0,
        }),
        InputEventKind::Key(Key::BTN_RIGHT) => Some(MouseEvent::Button {
            button: MouseButton::Right,
            pressed: event.value() != 0,
        }),
        InputEventKind::Synchronization(_) => Some(MouseEvent::Sync),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evdev::EventType;

    #[test]
    fn relative_motion_is_classified_per_axis() {
        let x = InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_X.0, -10);
        let y = InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_Y.0, 6);

        assert_eq!(classify(&x), Some(MouseEvent::MotionX(-10)));
        assert_eq!(classify(&y), Some(MouseEvent::MotionY(6)));
    }

    #[test]
    fn buttons_carry_their_pressed_state() {
        let press = InputEvent::new(EventType::KEY, Key::BTN_LEFT.code(), 1);
        let release = InputEvent::new(EventType::KEY, Key::BTN_RIGHT.code(), 0);

        assert_eq!(
            classify(&press),
            Some(MouseEvent::Button {
                button: MouseButton::Left,
                pressed: true
            })
        );
        assert_eq!(
            classify(&release),
            Some(MouseEvent::Button {
                button: MouseButton::Right,
                pressed: false
            })
        );
    }

    #[test]
    fn sync_is_a_no_op_marker() {
        let sync = InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);
        assert_eq!(classify(&sync), Some(MouseEvent::Sync));
    }

    #[test]
    fn unrelated_events_are_ignored() {
        let wheel = InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_WHEEL.0, 1);
        let key = InputEvent::new(EventType::KEY, Key::KEY_A.code(), 1);

        assert_eq!(classify(&wheel), None);
        assert_eq!(classify(&key), None);
    }
}
