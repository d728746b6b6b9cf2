//! Quadrature signal generation for the legacy mouse port.
//!
//! The encoder is a pure four-state machine per axis; the pulse generator
//! turns a signed motion delta into a paced train of encoder steps written
//! to the output lines.

pub mod encoder;
pub mod pulse;

pub use encoder::{AxisState, Direction};
pub use pulse::AxisPulseGenerator;

/// Motion axis of the mouse port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}
