//! The state of one configure-then-run cycle.
//!
//! A [`Session`] owns the pending command, the output log, the optional
//! duration override and the progress callback. Nothing is shared between
//! sessions, so two conversions configured side by side cannot leak tokens
//! or log lines into each other.
//!
//! # Example
//!
//! ```ignore
//! use ffconvert_core::{MainOption, OutputTarget, ProcessDriver, Session};
//!
//! let mut session = Session::new();
//! session.convert("in.avi", Some(OutputTarget::parse("mp4")), |s| {
//!     s.option(MainOption::Overwrite)?;
//!     s.option(MainOption::Duration("00:01:00".into()))?;
//!     Ok(())
//! })?;
//! session.while_converting(|progress| {
//!     if let Some(eta) = progress.eta() {
//!         eprintln!("eta {:.0}s", eta);
//!     }
//! });
//!
//! ProcessDriver::with_defaults().run(&mut session).await?;
//! ```

mod command;
mod log;

use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::estimator::{FfmpegOutputClassifier, OutputClassifier, ProgressEstimator};
use crate::options::{MainOption, OptionError, OutputTarget};

pub use command::CommandAssembler;
pub use log::{LogEntry, TimestampLog};

/// Called once per captured output record, after it has been logged.
pub type ProgressCallback = Box<dyn FnMut(&ProgressEstimator<'_>) + Send>;

/// One conversion session.
pub struct Session {
    id: Uuid,
    command: CommandAssembler,
    log: TimestampLog,
    duration_override: Option<f64>,
    callback: Option<ProgressCallback>,
    classifier: Box<dyn OutputClassifier>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates an empty session reading ffmpeg's output format.
    pub fn new() -> Self {
        Self::with_classifier(FfmpegOutputClassifier::new())
    }

    /// Creates an empty session with a custom output classifier.
    pub fn with_classifier(classifier: impl OutputClassifier + 'static) -> Self {
        Self {
            id: Uuid::new_v4(),
            command: CommandAssembler::new(),
            log: TimestampLog::new(),
            duration_override: None,
            callback: None,
            classifier: Box::new(classifier),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn command(&self) -> &CommandAssembler {
        &self.command
    }

    pub fn command_mut(&mut self) -> &mut CommandAssembler {
        &mut self.command
    }

    /// Builds a conversion: `-i <input>`, then whatever `configure` adds,
    /// then the output file if a target is given.
    ///
    /// If `configure` fails the pending command is cleared so a half-built
    /// invocation cannot be run.
    pub fn convert<F>(
        &mut self,
        input: &str,
        target: Option<OutputTarget>,
        configure: F,
    ) -> Result<&mut Self, OptionError>
    where
        F: FnOnce(&mut Self) -> Result<(), OptionError>,
    {
        self.command.append(format!("-i {}", input));

        if let Err(e) = configure(self) {
            self.command.clear();
            return Err(e);
        }

        if let Some(target) = target {
            self.command.append(target.resolve(input));
        }
        Ok(self)
    }

    /// Appends an option's tokens. [`MainOption::Duration`] also sets the
    /// duration override.
    pub fn option(&mut self, option: MainOption) -> Result<&mut Self, OptionError> {
        let tokens = option.tokens()?;
        if let Some(secs) = option.duration_override()? {
            self.set_duration_override(secs);
        }
        self.command.extend(tokens);
        Ok(self)
    }

    /// Pins the media duration used for ETA and progress.
    pub fn set_duration_override(&mut self, secs: f64) {
        self.duration_override = Some(secs);
    }

    pub fn clear_duration_override(&mut self) {
        self.duration_override = None;
    }

    pub fn duration_override(&self) -> Option<f64> {
        self.duration_override
    }

    /// Registers the callback fired after every captured output record.
    /// Replaces any previous callback.
    pub fn while_converting<F>(&mut self, callback: F)
    where
        F: FnMut(&ProgressEstimator<'_>) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    pub fn clear_callback(&mut self) {
        self.callback = None;
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    pub fn log(&self) -> &TimestampLog {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Estimator over the current log.
    pub fn estimator(&self) -> ProgressEstimator<'_> {
        ProgressEstimator::new(&self.log, self.duration_override, self.classifier.as_ref())
    }

    /// Estimated seconds until completion, `None` while the duration is unknown.
    pub fn current_eta(&self) -> Option<f64> {
        self.estimator().eta()
    }

    /// Fraction converted so far, `None` while the duration is unknown.
    pub fn current_progress(&self) -> Option<f64> {
        self.estimator().progress()
    }

    /// Logs an output record and fires the progress callback.
    pub fn record_line(&mut self, line: impl Into<String>) {
        self.log.append(line);
        self.notify();
    }

    /// Like [`record_line`](Self::record_line) with an explicit capture offset.
    pub fn record_line_at(&mut self, elapsed: Duration, line: impl Into<String>) {
        self.log.append_at(elapsed, line);
        self.notify();
    }

    /// Closes the run: the command and the log are cleared. The duration
    /// override and the callback stay registered.
    pub fn end_run(&mut self) {
        debug!(session = %self.id, records = self.log.len(), "Ending run");
        self.command.clear();
        self.log.clear();
    }

    fn notify(&mut self) {
        if let Some(callback) = self.callback.as_mut() {
            let estimator = ProgressEstimator::new(
                &self.log,
                self.duration_override,
                self.classifier.as_ref(),
            );
            callback(&estimator);
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("command", &self.command)
            .field("log_entries", &self.log.len())
            .field("duration_override", &self.duration_override)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}
