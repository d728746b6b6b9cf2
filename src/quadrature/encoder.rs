//! Per-axis quadrature phase state machine.

/// Line pairs for forward (clockwise) motion: 00 -> 01 -> 11 -> 10 -> 00.
///
/// Exactly one line changes per transition; the receiving hardware decodes
/// direction from which line moved first, so this table must not be reordered.
const QUAD_STATES: [(bool, bool); 4] = [
    (false, false), // phase 0
    (false, true),  // phase 1
    (true, true),   // phase 2
    (true, false),  // phase 3
];

/// Step direction through the four-phase cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Direction of a nonzero motion delta.
    pub fn from_delta(delta: i32) -> Self {
        if delta > 0 {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }
}

/// Quadrature phase state of one axis.
///
/// The phase is always one of the four legal states; there is no transition
/// that can leave it anywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisState {
    phase: u8,
}

impl AxisState {
    pub fn new() -> Self {
        Self { phase: 0 }
    }

    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Line pair for the current phase.
    pub fn lines(&self) -> (bool, bool) {
        QUAD_STATES[self.phase as usize]
    }

    /// Advances one step in `direction` and returns the new line pair.
    pub fn advance(&mut self, direction: Direction) -> (bool, bool) {
        self.phase = match direction {
            Direction::Forward => (self.phase + 1) % 4,
            Direction::Backward => (self.phase + 3) % 4,
        };
        QUAD_STATES[self.phase as usize]
    }
}

impl Default for AxisState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_cycle_follows_table() {
        let mut state = AxisState::new();
        assert_eq!(state.lines(), (false, false));

        assert_eq!(state.advance(Direction::Forward), (false, true));
        assert_eq!(state.advance(Direction::Forward), (true, true));
        assert_eq!(state.advance(Direction::Forward), (true, false));
        assert_eq!(state.advance(Direction::Forward), (false, false));
        assert_eq!(state.phase(), 0);
    }

    #[test]
    fn backward_cycle_follows_table_in_reverse() {
        let mut state = AxisState::new();

        assert_eq!(state.advance(Direction::Backward), (true, false));
        assert_eq!(state.advance(Direction::Backward), (true, true));
        assert_eq!(state.advance(Direction::Backward), (false, true));
        assert_eq!(state.advance(Direction::Backward), (false, false));
        assert_eq!(state.phase(), 0);
    }

    #[test]
    fn single_line_changes_per_transition() {
        let mut state = AxisState::new();
        let mut previous = state.lines();

        for step in 0..32 {
            let direction = if step % 3 == 0 {
                Direction::Backward
            } else {
                Direction::Forward
            };
            let current = state.advance(direction);
            let changed =
                (previous.0 != current.0) as u8 + (previous.1 != current.1) as u8;
            assert_eq!(changed, 1, "more than one line changed in a single step");
            previous = current;
        }
    }

    #[test]
    fn alternating_directions_stay_on_legal_phases() {
        let mut state = AxisState::new();

        for step in 0..100 {
            let direction = if step % 2 == 0 {
                Direction::Forward
            } else {
                Direction::Backward
            };
            let lines = state.advance(direction);
            assert!(state.phase() < 4);
            assert_eq!(lines, state.lines());
        }
        // Equal numbers of forward and backward steps cancel out.
        assert_eq!(state.phase(), 0);
    }

    #[test]
    fn direction_from_delta_sign() {
        assert_eq!(Direction::from_delta(3), Direction::Forward);
        assert_eq!(Direction::from_delta(-7), Direction::Backward);
    }
}
