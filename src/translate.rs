//! Event translation: decoded mouse events to quadrature trains and button
//! line writes.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::input::{MouseButton, MouseEvent};
use crate::quadrature::{Axis, AxisPulseGenerator, AxisState};
use crate::sink::{Line, LineSink};

/// Translates decoded input events into output line activity.
///
/// Axis and button state survive source replacement: the supervisor swaps
/// input handles underneath a single translator, so the receiver never sees
/// a phase jump across a hot-unplug.
pub struct EventTranslator {
    x_state: AxisState,
    y_state: AxisState,
    x_pulses: AxisPulseGenerator,
    y_pulses: AxisPulseGenerator,
    left_pressed: bool,
    right_pressed: bool,
    sensitivity: i32,
    sink: Box<dyn LineSink>,
    cancel: CancellationToken,
}

impl EventTranslator {
    /// `sensitivity` is a hard precondition enforced at configuration
    /// resolution; it divides raw motion before pulse generation.
    pub fn new(sink: Box<dyn LineSink>, sensitivity: i32, cancel: CancellationToken) -> Self {
        debug_assert!(sensitivity >= 1);
        Self {
            x_state: AxisState::new(),
            y_state: AxisState::new(),
            x_pulses: AxisPulseGenerator::new(Axis::X),
            y_pulses: AxisPulseGenerator::new(Axis::Y),
            left_pressed: false,
            right_pressed: false,
            sensitivity,
            sink,
            cancel,
        }
    }

    pub async fn translate(&mut self, event: MouseEvent) {
        match event {
            MouseEvent::MotionX(value) => {
                debug!("X movement: {}", value);
                // The legacy port counts X opposite to the USB convention.
                let movement = -value / self.sensitivity;
                if movement != 0 {
                    self.x_pulses
                        .emit(movement, &mut self.x_state, self.sink.as_mut(), &self.cancel)
                        .await;
                }
            }
            MouseEvent::MotionY(value) => {
                debug!("Y movement: {}", value);
                let movement = value / self.sensitivity;
                if movement != 0 {
                    // Vertical polarity is inverted on the legacy port.
                    self.y_pulses
                        .emit(-movement, &mut self.y_state, self.sink.as_mut(), &self.cancel)
                        .await;
                }
            }
            MouseEvent::Button { button, pressed } => self.write_button(button, pressed),
            MouseEvent::Sync => {}
        }
    }

    /// Mirrors a button state onto its line. Buttons are active-low: an
    /// idle or unconnected line reads as released.
    fn write_button(&mut self, button: MouseButton, pressed: bool) {
        let line = match button {
            MouseButton::Left => {
                self.left_pressed = pressed;
                Line::ButtonLeft
            }
            MouseButton::Right => {
                self.right_pressed = pressed;
                Line::ButtonRight
            }
        };
        debug!(
            "{:?} button {}",
            button,
            if pressed { "pressed" } else { "released" }
        );
        if let Err(e) = self.sink.set_line(line, !pressed) {
            warn!("Failed to drive {:?}: {}", line, e);
        }
    }

    /// Parks all six lines in their idle state: quadrature low, buttons
    /// released. Called once on shutdown.
    pub fn reset_lines(&mut self) {
        if self.left_pressed || self.right_pressed {
            debug!("Releasing buttons held at shutdown");
        }
        for line in [Line::XA, Line::XB, Line::YA, Line::YB] {
            if let Err(e) = self.sink.set_line(line, false) {
                warn!("Failed to park {:?}: {}", line, e);
            }
        }
        for line in [Line::ButtonLeft, Line::ButtonRight] {
            if let Err(e) = self.sink.set_line(line, true) {
                warn!("Failed to park {:?}: {}", line, e);
            }
        }
        self.x_state = AxisState::new();
        self.y_state = AxisState::new();
        self.left_pressed = false;
        self.right_pressed = false;
    }

    #[cfg(test)]
    pub(crate) fn phases(&self) -> (u8, u8) {
        (self.x_state.phase(), self.y_state.phase())
    }
}
