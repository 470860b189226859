//! Error types for the process driver.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The executable could not be found.
    #[error("Executable not found: {path}")]
    ExecutableNotFound { path: PathBuf },

    /// The command tokens could not be split into arguments.
    #[error("Invalid command: {reason}")]
    InvalidCommand { reason: String },

    /// The process exited with a non-zero status.
    #[error("Process failed with exit code {code:?}")]
    ProcessFailed {
        code: Option<i32>,
        output: Option<String>,
    },

    /// The run exceeded its deadline.
    #[error("Run timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The run was cancelled by the caller.
    #[error("Run cancelled")]
    Cancelled,

    /// I/O error while talking to the process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DriverError {
    /// Creates a process failure, dropping empty captured output.
    pub fn process_failed(code: Option<i32>, output: String) -> Self {
        Self::ProcessFailed {
            code,
            output: if output.is_empty() { None } else { Some(output) },
        }
    }

    /// Exit code to report for this error from a command-line tool.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ProcessFailed { code: Some(code), .. } if *code != 0 => *code,
            Self::ExecutableNotFound { .. } => 127,
            Self::Cancelled => 130,
            _ => 1,
        }
    }
}
