//! Source supervisor: owns the lifecycle of the input source handle.
//!
//! # State machine
//!
//! ```text
//! Searching ──► Open ──► Reading ──► Closing ──► Searching
//!     │           │                     │
//!     │           └──► Searching        │
//!     └─────────► Stopped ◄─────────────┘
//! ```
//!
//! Exactly one source handle is open at any instant. Translator state is
//! carried through every transition and never reset on a
//! `Closing → Searching` cycle: only the handle is replaced, so quadrature
//! phase stays continuous across a hot-unplug.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use evdev::{Device, EventStream};
use statum::{machine, state, transition};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::input::classify;
use crate::input::discovery::{self, DeviceSource};
use crate::translate::EventTranslator;

/// Supervisor settings.
#[derive(Clone, Debug)]
pub struct SupervisorSettings {
    /// Fixed source path; `None` enables auto-discovery.
    pub device_path: Option<PathBuf>,
    /// Pause between failed discovery scans.
    pub scan_interval: Duration,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            device_path: None,
            scan_interval: Duration::from_secs(3),
        }
    }
}

/// Lifecycle states of the source supervisor.
#[state]
#[derive(Debug, Clone)]
pub enum SupervisorState {
    Searching, // Scanning for a usable source
    Open,      // Candidate found, acquiring the handle
    Reading,   // Consuming events from the open handle
    Closing,   // Releasing the handle
    Stopped,   // Terminal, everything released
}

#[machine]
pub struct SourceSupervisor<SupervisorState> {
    settings: SupervisorSettings,
    translator: EventTranslator,
    cancel: CancellationToken,
    candidate: Option<DeviceSource>,
    stream: Option<EventStream>,
}

#[transition]
impl SourceSupervisor<Searching> {
    fn into_open(self) -> SourceSupervisor<Open> {
        self.transition()
    }

    fn into_stopped(self) -> SourceSupervisor<Stopped> {
        self.transition()
    }
}

#[transition]
impl SourceSupervisor<Open> {
    fn into_reading(self) -> SourceSupervisor<Reading> {
        self.transition()
    }

    fn into_searching(self) -> SourceSupervisor<Searching> {
        self.transition()
    }
}

#[transition]
impl SourceSupervisor<Reading> {
    fn into_closing(self) -> SourceSupervisor<Closing> {
        self.transition()
    }
}

#[transition]
impl SourceSupervisor<Closing> {
    fn into_searching(self) -> SourceSupervisor<Searching> {
        self.transition()
    }

    fn into_stopped(self) -> SourceSupervisor<Stopped> {
        self.transition()
    }
}

pub enum SearchOutcome {
    Found(SourceSupervisor<Open>),
    Stopped(SourceSupervisor<Stopped>),
}

pub enum AcquireOutcome {
    Acquired(SourceSupervisor<Reading>),
    Lost(SourceSupervisor<Searching>),
}

pub enum ReleaseOutcome {
    Resume(SourceSupervisor<Searching>),
    Stopped(SourceSupervisor<Stopped>),
}

impl SourceSupervisor<Searching> {
    pub fn create(
        settings: SupervisorSettings,
        translator: EventTranslator,
        cancel: CancellationToken,
    ) -> Self {
        Self::builder()
            .settings(settings)
            .translator(translator)
            .cancel(cancel)
            .candidate(None)
            .stream(None)
            .build()
    }

    /// Scans for a usable source until one appears or a stop is requested.
    ///
    /// With a fixed path configured, only that path is probed; otherwise
    /// every present input device is tested for relative-motion support.
    pub async fn search(mut self) -> SearchOutcome {
        info!("Searching for a pointing device");

        loop {
            if self.cancel.is_cancelled() {
                return SearchOutcome::Stopped(self.into_stopped());
            }

            let found = match &self.settings.device_path {
                Some(path) => discovery::probe(path).then(|| DeviceSource {
                    path: path.clone(),
                    name: "configured device".to_string(),
                }),
                None => discovery::find_pointing_device(),
            };

            if let Some(source) = found {
                self.candidate = Some(source);
                return SearchOutcome::Found(self.into_open());
            }

            debug!(
                "No pointing device found, retrying in {:?}",
                self.settings.scan_interval
            );
            tokio::select! {
                _ = self.cancel.cancelled() => return SearchOutcome::Stopped(self.into_stopped()),
                _ = tokio::time::sleep(self.settings.scan_interval) => {}
            }
        }
    }
}

impl SourceSupervisor<Open> {
    /// Acquires an exclusive handle on the detected source. The device may
    /// have vanished between detection and open; that sends us back to
    /// searching, never up the stack.
    pub fn acquire(mut self) -> AcquireOutcome {
        let Some(source) = self.candidate.take() else {
            warn!("Open state entered without a candidate source");
            return AcquireOutcome::Lost(self.into_searching());
        };

        let device = match Device::open(&source.path) {
            Ok(device) => device,
            Err(e) => {
                info!(
                    "Source {} vanished before open: {}",
                    source.path.display(),
                    e
                );
                return AcquireOutcome::Lost(self.into_searching());
            }
        };

        match device.into_event_stream() {
            Ok(stream) => {
                info!(
                    "Reading events from {} ({})",
                    source.path.display(),
                    source.name
                );
                self.stream = Some(stream);
                AcquireOutcome::Acquired(self.into_reading())
            }
            Err(e) => {
                warn!(
                    "Failed to register {} with the reactor: {}",
                    source.path.display(),
                    e
                );
                AcquireOutcome::Lost(self.into_searching())
            }
        }
    }
}

impl SourceSupervisor<Reading> {
    /// Consumes events until the source disappears or a stop is requested.
    ///
    /// The stop signal is observed between reads and inside any in-flight
    /// pulse train, so shutdown latency stays bounded. Transient read errors
    /// are retried in place; every other error is treated as a disconnect.
    pub async fn read_events(mut self) -> SourceSupervisor<Closing> {
        let Some(mut stream) = self.stream.take() else {
            warn!("Reading state entered without an open source");
            return self.into_closing();
        };

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("Stop requested, closing input source");
                    break;
                }
                result = stream.next_event() => match result {
                    Ok(event) => {
                        if let Some(decoded) = classify(&event) {
                            self.translator.translate(decoded).await;
                        }
                    }
                    Err(e) if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) => {
                        debug!("Transient read error, retrying: {}", e);
                    }
                    Err(e) => {
                        info!("Input source lost: {}", e);
                        break;
                    }
                }
            }
        }

        self.stream = Some(stream);
        self.into_closing()
    }
}

impl SourceSupervisor<Closing> {
    /// Releases the handle and decides whether to resume scanning.
    pub fn release(mut self) -> ReleaseOutcome {
        self.stream = None;
        debug!("Input source handle released");

        if self.cancel.is_cancelled() {
            ReleaseOutcome::Stopped(self.into_stopped())
        } else {
            info!("Looking for a new pointing device");
            ReleaseOutcome::Resume(self.into_searching())
        }
    }
}

impl SourceSupervisor<Stopped> {
    /// Parks the output lines and tears the supervisor down.
    pub fn finish(mut self) {
        self.translator.reset_lines();
        info!("Source supervisor stopped");
    }
}

/// Drives the supervisor until a stop is requested.
///
/// The translator is owned by the machine for the whole run, so axis and
/// button state survive every source replacement.
pub async fn run(
    settings: SupervisorSettings,
    translator: EventTranslator,
    cancel: CancellationToken,
) {
    let mut searching = SourceSupervisor::create(settings, translator, cancel);

    loop {
        let open = match searching.search().await {
            SearchOutcome::Found(open) => open,
            SearchOutcome::Stopped(stopped) => return stopped.finish(),
        };

        let reading = match open.acquire() {
            AcquireOutcome::Acquired(reading) => reading,
            AcquireOutcome::Lost(lost) => {
                searching = lost;
                continue;
            }
        };

        let closing = reading.read_events().await;

        searching = match closing.release() {
            ReleaseOutcome::Resume(next) => next,
            ReleaseOutcome::Stopped(stopped) => return stopped.finish(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::mock::RecordingSink;
    use crate::sink::Line;

    #[tokio::test(start_paused = true)]
    async fn stop_before_search_parks_the_lines() {
        let (sink, writes) = RecordingSink::new();
        let cancel = CancellationToken::new();
        let translator = EventTranslator::new(Box::new(sink), 2, cancel.clone());
        cancel.cancel();

        run(SupervisorSettings::default(), translator, cancel).await;

        let writes = writes.lock().unwrap();
        assert_eq!(
            writes.as_slice(),
            &[
                (Line::XA, false),
                (Line::XB, false),
                (Line::YA, false),
                (Line::YB, false),
                (Line::ButtonLeft, true),
                (Line::ButtonRight, true),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stop_during_scan_wait_terminates_the_search() {
        let (sink, writes) = RecordingSink::new();
        let cancel = CancellationToken::new();
        let translator = EventTranslator::new(Box::new(sink), 2, cancel.clone());

        let settings = SupervisorSettings {
            device_path: Some(PathBuf::from("/dev/input/does-not-exist")),
            ..Default::default()
        };

        let stopper = cancel.clone();
        tokio::join!(run(settings, translator, cancel), async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            stopper.cancel();
        });

        // Supervisor terminated and parked the port.
        assert_eq!(writes.lock().unwrap().len(), 6);
    }
}
