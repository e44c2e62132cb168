//! Deployment configuration: server bind address, device geometry, and
//! default test parameters.
//!
//! Every field has a serde default matching the original deployment
//! constants, so behavior is unchanged when no config file is present.
//! Load order: `$TACTUS_CONFIG` env var, then `./tactus.toml`, then
//! built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Config loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),
}

// ============================================================================
// Sections
// ============================================================================

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_addr")]
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

fn default_addr() -> String {
    "0.0.0.0:5000".to_string()
}

/// Sensor device geometry. Only the flat delimited ingest shape depends on
/// these; the JSON shapes are self-describing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Transmit channels reported per flat record
    #[serde(default = "default_channels")]
    pub channels: usize,

    /// Reading values per channel
    #[serde(default = "default_readings_per_channel")]
    pub readings_per_channel: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            readings_per_channel: default_readings_per_channel(),
        }
    }
}

fn default_channels() -> usize {
    1
}

fn default_readings_per_channel() -> usize {
    7
}

/// Default test parameters applied when a start request omits them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TestDefaults {
    #[serde(default = "default_cycles")]
    pub cycles: u32,

    /// Seconds per Touch or Untouch phase
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u32,

    #[serde(default = "default_soft_threshold")]
    pub soft_threshold: f64,

    #[serde(default = "default_fresh_threshold")]
    pub fresh_threshold: f64,
}

impl Default for TestDefaults {
    fn default() -> Self {
        Self {
            cycles: default_cycles(),
            duration_secs: default_duration_secs(),
            soft_threshold: default_soft_threshold(),
            fresh_threshold: default_fresh_threshold(),
        }
    }
}

fn default_cycles() -> u32 {
    3
}

fn default_duration_secs() -> u32 {
    5
}

fn default_soft_threshold() -> f64 {
    350.0
}

fn default_fresh_threshold() -> f64 {
    750.0
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a test-bench deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TactusConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub device: DeviceConfig,

    #[serde(default)]
    pub test: TestDefaults,
}

impl TactusConfig {
    /// Load configuration using the standard search order:
    /// 1. `$TACTUS_CONFIG` environment variable
    /// 2. `./tactus.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("TACTUS_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from TACTUS_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from TACTUS_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "TACTUS_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from("tactus.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./tactus.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./tactus.toml, using defaults");
                }
            }
        }

        info!("No tactus.toml found - using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }
}
