//! Output capability for the six mouse port lines.
//!
//! The translation engine is written against [`LineSink`] only; the concrete
//! backend is selected at startup. Implementations own no policy: callers
//! decide levels, and writes to the two lines of one axis must be applied in
//! call order.

pub mod gpio;
#[cfg(test)]
pub mod mock;

pub use gpio::GpioSink;

/// Logical output lines of the legacy mouse port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
    XA,
    XB,
    YA,
    YB,
    ButtonLeft,
    ButtonRight,
}

/// Sink errors.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to initialize output backend: {0}")]
    InitializationError(String),

    #[error("Failed to set line {0:?}: {1}")]
    WriteError(Line, String),
}

/// Sets a named line to a high or low level.
pub trait LineSink: Send {
    fn set_line(&mut self, line: Line, high: bool) -> Result<(), SinkError>;
}
