//! GPIO backend driving the mouse port lines through rppal.

use rppal::gpio::{Gpio, OutputPin};
use tracing::{debug, info};

use super::{Line, LineSink, SinkError};
use crate::config::PinConfig;

/// Owns the six output pins for the duration of the run.
///
/// Quadrature lines start low, button lines start high (buttons are
/// active-low, so high reads as released). Dropping the sink parks every
/// line back in that idle state.
pub struct GpioSink {
    xa: OutputPin,
    xb: OutputPin,
    ya: OutputPin,
    yb: OutputPin,
    button_left: OutputPin,
    button_right: OutputPin,
}

impl GpioSink {
    /// Claims the configured pins. Failure here is fatal for the process:
    /// without an output capability there is nothing to translate into.
    pub fn new(pins: &PinConfig) -> Result<Self, SinkError> {
        let gpio = Gpio::new().map_err(|e| SinkError::InitializationError(e.to_string()))?;

        debug!("Configuring GPIO pins as outputs: {:?}", pins);
        let sink = Self {
            xa: claim_low(&gpio, pins.xa)?,
            xb: claim_low(&gpio, pins.xb)?,
            ya: claim_low(&gpio, pins.ya)?,
            yb: claim_low(&gpio, pins.yb)?,
            button_left: claim_high(&gpio, pins.button_left)?,
            button_right: claim_high(&gpio, pins.button_right)?,
        };

        info!("GPIO initialization complete");
        Ok(sink)
    }

    fn pin(&mut self, line: Line) -> &mut OutputPin {
        match line {
            Line::XA => &mut self.xa,
            Line::XB => &mut self.xb,
            Line::YA => &mut self.ya,
            Line::YB => &mut self.yb,
            Line::ButtonLeft => &mut self.button_left,
            Line::ButtonRight => &mut self.button_right,
        }
    }
}

impl LineSink for GpioSink {
    fn set_line(&mut self, line: Line, high: bool) -> Result<(), SinkError> {
        let pin = self.pin(line);
        if high {
            pin.set_high();
        } else {
            pin.set_low();
        }
        Ok(())
    }
}

impl Drop for GpioSink {
    fn drop(&mut self) {
        // Quadrature idle, buttons released.
        self.xa.set_low();
        self.xb.set_low();
        self.ya.set_low();
        self.yb.set_low();
        self.button_left.set_high();
        self.button_right.set_high();
        debug!("GPIO lines parked");
    }
}

fn claim_low(gpio: &Gpio, pin: u8) -> Result<OutputPin, SinkError> {
    let mut out = gpio
        .get(pin)
        .map_err(|e| SinkError::InitializationError(format!("pin {}: {}", pin, e)))?
        .into_output_low();
    // Levels must outlive the process so the receiver sees the idle state.
    out.set_reset_on_drop(false);
    Ok(out)
}

fn claim_high(gpio: &Gpio, pin: u8) -> Result<OutputPin, SinkError> {
    let mut out = gpio
        .get(pin)
        .map_err(|e| SinkError::InitializationError(format!("pin {}: {}", pin, e)))?
        .into_output_high();
    out.set_reset_on_drop(false);
    Ok(out)
}
