//! Configuration for the process driver.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the external converter is invoked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Path to the ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub path: PathBuf,

    /// Total deadline for a single run in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Extra tokens [`ProcessDriver::convert`](super::ProcessDriver::convert)
    /// places after the caller's options, before the output file.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_timeout() -> u64 {
    3600 // 1 hour
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            path: default_ffmpeg_path(),
            timeout_secs: default_timeout(),
            extra_args: Vec::new(),
        }
    }
}

impl DriverConfig {
    /// Creates a config for a specific executable.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the extra arguments.
    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }
}
