//! Configuration resolution: TOML file merged with command-line overrides.
//!
//! Resolution order: explicit `--config` path, then the user config
//! directory, then `/etc/quadmouse/config.toml`, then built-in defaults.
//! CLI flags override whatever the file provided. The result is immutable
//! for the process lifetime.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_SENSITIVITY: i32 = 2;
const SYSTEM_CONFIG_PATH: &str = "/etc/quadmouse/config.toml";

#[derive(Parser, Debug)]
#[command(
    name = "quadmouse",
    version,
    about = "Atari ST mouse simulator using GPIO"
)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Input device path (e.g. /dev/input/event1); omit for auto-detection
    #[arg(short = 'D', long)]
    pub device: Option<PathBuf>,

    /// Movement sensitivity divisor (1 = normal, 2 = half, ...)
    #[arg(short, long)]
    pub sensitivity: Option<i32>,

    /// GPIO pin for the XA signal
    #[arg(long)]
    pub pin_xa: Option<u8>,

    /// GPIO pin for the XB signal
    #[arg(long)]
    pub pin_xb: Option<u8>,

    /// GPIO pin for the YA signal
    #[arg(long)]
    pub pin_ya: Option<u8>,

    /// GPIO pin for the YB signal
    #[arg(long)]
    pub pin_yb: Option<u8>,

    /// GPIO pin for the left button
    #[arg(long)]
    pub pin_left: Option<u8>,

    /// GPIO pin for the right button
    #[arg(long)]
    pub pin_right: Option<u8>,
}

/// BCM pin assignment for the six port lines.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct PinConfig {
    pub xa: u8,
    pub xb: u8,
    pub ya: u8,
    pub yb: u8,
    pub button_left: u8,
    pub button_right: u8,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            xa: 27,
            xb: 24,
            ya: 28,
            yb: 25,
            button_left: 23,
            button_right: 29,
        }
    }
}

/// Resolved run parameters.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct BridgeConfig {
    pub pins: PinConfig,
    pub sensitivity: i32,
    /// Fixed input source; `None` enables auto-discovery.
    pub device_path: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            pins: PinConfig::default(),
            sensitivity: DEFAULT_SENSITIVITY,
            device_path: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    ParseError(PathBuf, toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Loads the config file (if any), applies CLI overrides and validates the
/// result.
pub fn resolve(cli: &Cli) -> Result<BridgeConfig, ConfigError> {
    let mut config = match config_file_path(cli) {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            toml::from_str(&raw).map_err(|e| ConfigError::ParseError(path, e))?
        }
        None => {
            info!("No configuration file found, using defaults");
            BridgeConfig::default()
        }
    };

    if let Some(device) = &cli.device {
        config.device_path = Some(device.clone());
    }
    if let Some(sensitivity) = cli.sensitivity {
        config.sensitivity = sensitivity;
    }
    if let Some(pin) = cli.pin_xa {
        config.pins.xa = pin;
    }
    if let Some(pin) = cli.pin_xb {
        config.pins.xb = pin;
    }
    if let Some(pin) = cli.pin_ya {
        config.pins.ya = pin;
    }
    if let Some(pin) = cli.pin_yb {
        config.pins.yb = pin;
    }
    if let Some(pin) = cli.pin_left {
        config.pins.button_left = pin;
    }
    if let Some(pin) = cli.pin_right {
        config.pins.button_right = pin;
    }

    validate(&config)?;
    Ok(config)
}

/// Picks the config file to load. An explicit `--config` must exist; the
/// default locations are optional.
fn config_file_path(cli: &Cli) -> Option<PathBuf> {
    if let Some(path) = &cli.config {
        return Some(path.clone());
    }

    if let Some(dir) = dirs::config_dir() {
        let user_path = dir.join("quadmouse/config.toml");
        if user_path.is_file() {
            return Some(user_path);
        }
    }

    let system_path = PathBuf::from(SYSTEM_CONFIG_PATH);
    system_path.is_file().then_some(system_path)
}

fn validate(config: &BridgeConfig) -> Result<(), ConfigError> {
    if config.sensitivity < 1 {
        return Err(ConfigError::ValidationError(format!(
            "sensitivity must be >= 1, got {}",
            config.sensitivity
        )));
    }

    let pins = [
        config.pins.xa,
        config.pins.xb,
        config.pins.ya,
        config.pins.yb,
        config.pins.button_left,
        config.pins.button_right,
    ];
    for (i, pin) in pins.iter().enumerate() {
        if pins[i + 1..].contains(pin) {
            return Err(ConfigError::ValidationError(format!(
                "pin {} is assigned to more than one line",
                pin
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_board_mapping() {
        let config = BridgeConfig::default();
        assert_eq!(config.pins.xa, 27);
        assert_eq!(config.pins.xb, 24);
        assert_eq!(config.pins.ya, 28);
        assert_eq!(config.pins.yb, 25);
        assert_eq!(config.pins.button_left, 23);
        assert_eq!(config.pins.button_right, 29);
        assert_eq!(config.sensitivity, 2);
        assert!(config.device_path.is_none());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: BridgeConfig = toml::from_str(
            r#"
            sensitivity = 4

            [pins]
            xa = 17
            "#,
        )
        .unwrap();

        assert_eq!(config.sensitivity, 4);
        assert_eq!(config.pins.xa, 17);
        assert_eq!(config.pins.xb, 24);
    }

    #[test]
    fn cli_overrides_win() {
        let cli = Cli::parse_from([
            "quadmouse",
            "--sensitivity",
            "3",
            "--pin-xa",
            "5",
            "-D",
            "/dev/input/event2",
        ]);
        let config = resolve(&cli).unwrap();

        assert_eq!(config.sensitivity, 3);
        assert_eq!(config.pins.xa, 5);
        assert_eq!(
            config.device_path.as_deref(),
            Some(std::path::Path::new("/dev/input/event2"))
        );
    }

    #[test]
    fn sensitivity_below_one_is_rejected() {
        let cli = Cli::parse_from(["quadmouse", "--sensitivity", "0"]);
        assert!(matches!(
            resolve(&cli),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn duplicate_pins_are_rejected() {
        let cli = Cli::parse_from(["quadmouse", "--pin-xa", "24"]);
        assert!(matches!(
            resolve(&cli),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn missing_explicit_config_file_is_an_error() {
        let cli = Cli::parse_from(["quadmouse", "--config", "/does/not/exist.toml"]);
        assert!(matches!(resolve(&cli), Err(ConfigError::ReadError(..))));
    }
}
