//! Runs the assembled command and streams its output into the session.

use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, trace, warn};

use crate::options::{MainOption, OptionError, OutputTarget};
use crate::session::Session;

use super::cancel::CancelHandle;
use super::config::DriverConfig;
use super::error::DriverError;
use super::types::RunSummary;

/// The converter redraws its status line in place, so records end with a
/// carriage return rather than a newline.
const RECORD_DELIMITER: u8 = b'\r';

/// Upper bound on the error text kept for a failed run.
const MAX_ERROR_OUTPUT: usize = 8 * 1024;

#[derive(Debug, Clone, Copy)]
enum Pipe {
    Stdout,
    Stderr,
}

enum Interrupt {
    Timeout,
    Cancelled,
}

/// Executes a session's command as a child process.
///
/// Standard output and standard error are both captured and split into
/// records on `\r`. Each record is appended to the session log and then the
/// session's progress callback runs, in the same task, before the next
/// record is read. When the run ends, however it ends, the session's command
/// and log are cleared.
pub struct ProcessDriver {
    config: DriverConfig,
}

impl ProcessDriver {
    /// Creates a new driver with the given configuration.
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    /// Creates a driver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(DriverConfig::default())
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Builds a conversion on `session` like [`Session::convert`], with the
    /// configured extra arguments after the caller's options and before the
    /// output file.
    pub fn convert<F>(
        &self,
        session: &mut Session,
        input: &str,
        target: Option<OutputTarget>,
        configure: F,
    ) -> Result<(), OptionError>
    where
        F: FnOnce(&mut Session) -> Result<(), OptionError>,
    {
        let extra_args = &self.config.extra_args;
        session.convert(input, target, |s| {
            configure(s)?;
            if !extra_args.is_empty() {
                s.option(MainOption::Raw(extra_args.clone()))?;
            }
            Ok(())
        })?;
        Ok(())
    }

    /// The command line this driver would run for the session.
    pub fn render(&self, session: &Session) -> String {
        session.command().render(&self.config.path.to_string_lossy())
    }

    /// Runs the session's command to completion.
    pub async fn run(&self, session: &mut Session) -> Result<RunSummary, DriverError> {
        self.run_with_cancel(session, &CancelHandle::new()).await
    }

    /// Runs the session's command until it completes, times out or `cancel`
    /// is triggered.
    pub async fn run_with_cancel(
        &self,
        session: &mut Session,
        cancel: &CancelHandle,
    ) -> Result<RunSummary, DriverError> {
        let result = self.execute(session, cancel).await;
        session.end_run();

        match &result {
            Ok(summary) => info!(
                session = %session.id(),
                lines = summary.lines,
                elapsed_ms = summary.elapsed_ms,
                "Run completed"
            ),
            Err(e) => warn!(session = %session.id(), "Run failed: {}", e),
        }
        result
    }

    async fn execute(
        &self,
        session: &mut Session,
        cancel: &CancelHandle,
    ) -> Result<RunSummary, DriverError> {
        let start = Instant::now();
        let executable = &self.config.path;

        if executable.as_os_str().is_empty() {
            return Err(DriverError::ExecutableNotFound {
                path: executable.clone(),
            });
        }

        let args = session
            .command()
            .arguments()
            .map_err(|e| DriverError::InvalidCommand {
                reason: e.to_string(),
            })?;

        info!(session = %session.id(), "Running: {}", self.render(session));

        let mut child = Command::new(executable)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DriverError::ExecutableNotFound {
                        path: executable.clone(),
                    }
                } else {
                    DriverError::Io(e)
                }
            })?;

        let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;
        let mut stdout = BufReader::new(stdout).split(RECORD_DELIMITER);
        let mut stderr = BufReader::new(stderr).split(RECORD_DELIMITER);
        let (mut stdout_open, mut stderr_open) = (true, true);

        let deadline = tokio::time::sleep(Duration::from_secs(self.config.timeout_secs));
        tokio::pin!(deadline);

        let mut lines = 0;
        let mut error_output = String::new();
        let mut last_line = String::new();

        while stdout_open || stderr_open {
            let (pipe, segment) = tokio::select! {
                biased;
                _ = &mut deadline => {
                    return Err(self.interrupt(&mut child, Interrupt::Timeout).await);
                }
                _ = cancel.cancelled() => {
                    return Err(self.interrupt(&mut child, Interrupt::Cancelled).await);
                }
                segment = stdout.next_segment(), if stdout_open => (Pipe::Stdout, segment),
                segment = stderr.next_segment(), if stderr_open => (Pipe::Stderr, segment),
            };

            match segment? {
                Some(bytes) => {
                    let Some(line) = decode_record(&bytes) else {
                        continue;
                    };
                    if is_error_line(&line) {
                        push_error(&mut error_output, &line);
                    }
                    trace!(session = %session.id(), "{:?}: {}", pipe, line);
                    lines += 1;
                    last_line.clone_from(&line);
                    session.record_line(line);
                }
                None => {
                    debug!(session = %session.id(), "{:?} closed", pipe);
                    match pipe {
                        Pipe::Stdout => stdout_open = false,
                        Pipe::Stderr => stderr_open = false,
                    }
                }
            }
        }

        let waited = tokio::select! {
            biased;
            _ = &mut deadline => Err(Interrupt::Timeout),
            _ = cancel.cancelled() => Err(Interrupt::Cancelled),
            status = child.wait() => Ok(status),
        };
        let status = match waited {
            Ok(status) => status?,
            Err(interrupt) => return Err(self.interrupt(&mut child, interrupt).await),
        };

        if !status.success() {
            if error_output.is_empty() {
                error_output = last_line;
            }
            return Err(DriverError::process_failed(status.code(), error_output));
        }

        let estimator = session.estimator();
        Ok(RunSummary {
            session_id: session.id(),
            exit_code: status.code(),
            lines,
            elapsed_ms: start.elapsed().as_millis() as u64,
            duration_secs: estimator.duration(),
            last_position_secs: estimator.last_position(),
        })
    }

    /// Kills the child and returns the error describing why.
    async fn interrupt(&self, child: &mut Child, interrupt: Interrupt) -> DriverError {
        let error = match interrupt {
            Interrupt::Timeout => DriverError::Timeout {
                timeout_secs: self.config.timeout_secs,
            },
            Interrupt::Cancelled => DriverError::Cancelled,
        };

        warn!("{}, killing process", error);
        if let Err(e) = child.kill().await {
            debug!("Failed to kill process: {}", e);
        }
        error
    }
}

fn missing_pipe(name: &str) -> DriverError {
    DriverError::Io(std::io::Error::other(format!("{} was not captured", name)))
}

/// Decodes one record. Surrounding line breaks are dropped and blank records
/// are skipped.
fn decode_record(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_matches(|c| c == '\n' || c == '\r');
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn is_error_line(line: &str) -> bool {
    line.contains("Error") || line.contains("error")
}

fn push_error(output: &mut String, line: &str) {
    if output.len() + line.len() >= MAX_ERROR_OUTPUT {
        return;
    }
    output.push_str(line);
    output.push('\n');
}
