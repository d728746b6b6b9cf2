//! Speed-adaptive pulse train generation.
//!
//! A large instantaneous mouse jump is emitted as faster pulses (bounded at
//! `MIN_DELAY`) instead of stalling real time, while small movements get
//! fully spaced pulses (bounded at `MAX_DELAY`) for receiver compatibility.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::quadrature::{Axis, AxisState, Direction};
use crate::sink::{Line, LineSink};

/// Minimum delay between transitions (fast movements).
pub const MIN_DELAY: Duration = Duration::from_micros(500);
/// Maximum delay between transitions (slow movements).
pub const MAX_DELAY: Duration = Duration::from_micros(2000);
/// Pulse count above which a movement is paced as fast.
pub const SPEED_THRESHOLD: u32 = 5;

/// Per-train delay based on the number of pulses.
pub fn pulse_delay(pulses: u32) -> Duration {
    if pulses <= SPEED_THRESHOLD {
        return MAX_DELAY;
    }

    let max = MAX_DELAY.as_micros() as u64;
    let min = MIN_DELAY.as_micros() as u64;
    let excess = u64::from(pulses - SPEED_THRESHOLD);
    let delay = max.saturating_sub(excess * (max - min) / 10);

    Duration::from_micros(delay.max(min))
}

/// Drives one axis of the quadrature encoder onto its pair of output lines.
pub struct AxisPulseGenerator {
    axis: Axis,
    line_a: Line,
    line_b: Line,
}

impl AxisPulseGenerator {
    pub fn new(axis: Axis) -> Self {
        let (line_a, line_b) = match axis {
            Axis::X => (Line::XA, Line::XB),
            Axis::Y => (Line::YA, Line::YB),
        };
        Self { axis, line_a, line_b }
    }

    /// Emits `|delta|` quadrature transitions in the direction of `sign(delta)`.
    ///
    /// Each step is written to the sink immediately, a-line before b-line,
    /// then paced by the adaptive delay. The train is not atomic: a
    /// cancellation finishes the current step and stops before the next one,
    /// leaving the axis on a legal phase. Sink write failures are logged and
    /// the train continues.
    pub async fn emit(
        &self,
        delta: i32,
        state: &mut AxisState,
        sink: &mut dyn LineSink,
        cancel: &CancellationToken,
    ) {
        debug_assert!(delta != 0, "pulse train requires a nonzero delta");
        if delta == 0 {
            return;
        }

        let direction = Direction::from_delta(delta);
        let pulses = delta.unsigned_abs();
        let delay = pulse_delay(pulses);
        debug!(
            "{:?} axis: {} pulses {:?}, delay {:?}",
            self.axis, pulses, direction, delay
        );

        for _ in 0..pulses {
            let (bit_a, bit_b) = state.advance(direction);

            if let Err(e) = sink.set_line(self.line_a, bit_a) {
                warn!("Failed to drive {:?}: {}", self.line_a, e);
            }
            if let Err(e) = sink.set_line(self.line_b, bit_b) {
                warn!("Failed to drive {:?}: {}", self.line_b, e);
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("{:?} axis: pulse train interrupted at phase {}", self.axis, state.phase());
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
