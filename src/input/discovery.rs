//! Discovery of candidate pointing devices.

use std::path::{Path, PathBuf};

use evdev::{Device, EventType};
use tracing::{debug, info};

/// A candidate input source found during enumeration.
#[derive(Debug, Clone)]
pub struct DeviceSource {
    pub path: PathBuf,
    pub name: String,
}

/// Tests whether the device at `path` can act as a pointing source.
///
/// A device qualifies when it reports relative motion events. A candidate
/// that fails the test is disqualified, not an error.
pub fn probe(path: &Path) -> bool {
    match Device::open(path) {
        Ok(device) => {
            let supported = device.supported_events().contains(EventType::RELATIVE);
            debug!(
                "{} {} relative motion events",
                path.display(),
                if supported { "supports" } else { "does not support" }
            );
            supported
        }
        Err(e) => {
            debug!("Probe failed for {}: {}", path.display(), e);
            false
        }
    }
}

/// Enumerates every input device currently present.
pub fn enumerate() -> Vec<DeviceSource> {
    evdev::enumerate()
        .map(|(path, device)| DeviceSource {
            name: device.name().unwrap_or("unknown").to_string(),
            path,
        })
        .collect()
}

/// Scans the available input devices for the first one that passes the
/// relative-motion capability test.
pub fn find_pointing_device() -> Option<DeviceSource> {
    for source in enumerate() {
        debug!("Testing device: {} ({})", source.path.display(), source.name);
        if probe(&source.path) {
            info!(
                "Pointing device detected: {} ({})",
                source.path.display(),
                source.name
            );
            return Some(source);
        }
    }
    None
}
