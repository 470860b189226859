//! Types for the process driver.

use serde::Serialize;
use uuid::Uuid;

/// Outcome of a successful run, captured before the session is cleared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Session the run belonged to.
    pub session_id: Uuid,
    /// Exit code of the process, `None` if it was ended by a signal.
    pub exit_code: Option<i32>,
    /// Number of output records captured.
    pub lines: usize,
    /// Wall time of the whole run.
    pub elapsed_ms: u64,
    /// Media duration known at the end of the run.
    pub duration_secs: Option<f64>,
    /// Last media position reported.
    pub last_position_secs: f64,
}
