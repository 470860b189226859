use serde::{Deserialize, Serialize};

use crate::driver::DriverConfig;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub ffmpeg: DriverConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Progress reporting configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProgressConfig {
    /// Whether the CLI draws a progress line.
    #[serde(default = "default_progress_enabled")]
    pub enabled: bool,
    /// Minimum time between two progress redraws.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: default_progress_enabled(),
            min_interval_ms: default_min_interval_ms(),
        }
    }
}

fn default_progress_enabled() -> bool {
    true
}

fn default_min_interval_ms() -> u64 {
    250
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter level, used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Levels accepted by `logging.level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];
