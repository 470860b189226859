//! Append-only record of the converter's output.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};

/// One output record, stamped when it was captured.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// Wall-clock capture time.
    pub captured_at: DateTime<Utc>,
    /// Monotonic time since the log was started; rates are computed from this.
    pub elapsed: Duration,
    /// The record as emitted, without its delimiter.
    pub raw_text: String,
}

impl LogEntry {
    /// Seconds since the log was started.
    pub fn wall_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Timestamped output of the active run.
///
/// Entries are only ever appended, in the order the records arrive, and their
/// `elapsed` values never decrease. The whole log is dropped by [`clear`].
///
/// [`clear`]: TimestampLog::clear
#[derive(Debug, Clone)]
pub struct TimestampLog {
    origin: Instant,
    origin_at: DateTime<Utc>,
    entries: Vec<LogEntry>,
}

impl Default for TimestampLog {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampLog {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            origin_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// Records a line stamped with the current time.
    pub fn append(&mut self, line: impl Into<String>) {
        let elapsed = self.origin.elapsed();
        self.append_at(elapsed, line);
    }

    /// Records a line at an explicit offset from the start of the log.
    ///
    /// Used when replaying captured output. An offset earlier than the last
    /// entry is raised to it so the log stays monotonic.
    pub fn append_at(&mut self, elapsed: Duration, line: impl Into<String>) {
        let elapsed = match self.entries.last() {
            Some(last) if last.elapsed > elapsed => last.elapsed,
            _ => elapsed,
        };
        let captured_at = self.origin_at
            + chrono::Duration::from_std(elapsed).unwrap_or_else(|_| chrono::Duration::zero());

        self.entries.push(LogEntry {
            captured_at,
            elapsed,
            raw_text: line.into(),
        });
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry and restarts the clock.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.origin = Instant::now();
        self.origin_at = Utc::now();
    }
}
