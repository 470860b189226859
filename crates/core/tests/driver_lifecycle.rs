//! Driver lifecycle integration tests.
//!
//! A small shell script stands in for ffmpeg: it prints a header with the
//! media duration, then progress records separated by carriage returns.

#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tempfile::TempDir;

use ffconvert_core::{
    CancelHandle, DriverConfig, DriverError, MainOption, OutputTarget, ProcessDriver, Session,
};

const CONVERTING: &str = r#"
printf 'Input #0, avi, from in.avi:\n  Duration: 00:00:10.00, start: 0.000000, bitrate: 1200 kb/s\n' >&2
printf 'frame=   25 fps=0.0 q=28.0 size=     256kB time=00:00:01.00 bitrate=2097.2kbits/s speed=2x\r' >&2
sleep 0.1
printf 'frame=   50 fps= 49 q=28.0 size=     512kB time=00:00:02.00 bitrate=2097.2kbits/s speed=2x\r' >&2
sleep 0.1
printf 'frame=  100 fps= 49 q=28.0 size=    1024kB time=00:00:04.00 bitrate=2097.2kbits/s speed=2x\r' >&2
sleep 0.1
echo 'muxing done'
"#;

/// Test helper owning the scratch directory and the fake converter.
struct TestHarness {
    script: PathBuf,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new(body: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let script = temp_dir.path().join("fake-ffmpeg.sh");
        std::fs::write(&script, body).expect("Failed to write script");

        Self {
            script,
            _temp_dir: temp_dir,
        }
    }

    /// The script is passed to `/bin/sh` so it never needs the exec bit.
    fn driver(&self, timeout_secs: u64) -> ProcessDriver {
        ProcessDriver::new(DriverConfig::with_path("/bin/sh").with_timeout(timeout_secs))
    }

    fn session(&self) -> Session {
        let mut session = Session::new();
        session.command_mut().append(script_arg(&self.script));
        session
            .convert("in.avi", Some(OutputTarget::parse("mp4")), |s| {
                s.option(MainOption::Overwrite)?;
                Ok(())
            })
            .expect("Failed to build command");
        session
    }
}

fn script_arg(path: &Path) -> String {
    path.display().to_string()
}

#[derive(Debug, Clone, Copy)]
struct Observation {
    log_len: usize,
    progress: Option<f64>,
    eta: Option<f64>,
}

#[tokio::test]
async fn test_run_reports_progress_per_record() {
    let harness = TestHarness::new(CONVERTING);
    let mut session = harness.session();

    let observed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&observed);
    session.while_converting(move |progress| {
        sink.lock().unwrap().push(Observation {
            log_len: progress.log().len(),
            progress: progress.progress(),
            eta: progress.eta(),
        });
    });

    let summary = harness.driver(30).run(&mut session).await.unwrap();

    assert_eq!(summary.exit_code, Some(0));
    assert_eq!(summary.lines, 4);
    assert_eq!(summary.duration_secs, Some(10.0));
    assert_eq!(summary.last_position_secs, 4.0);
    assert_eq!(summary.session_id, session.id());

    let observed = observed.lock().unwrap();
    assert_eq!(observed.len(), summary.lines);
    for (i, observation) in observed.iter().enumerate() {
        // The record is logged before the callback sees it.
        assert_eq!(observation.log_len, i + 1);

        let progress = observation.progress.unwrap();
        assert!(progress > 0.0 && progress < 1.0, "progress {}", progress);

        let eta = observation.eta.unwrap();
        assert!(eta.is_finite() && eta > 0.0, "eta {}", eta);
    }
    assert_eq!(observed.last().unwrap().progress, Some(0.4));

    // The run boundary clears the command and the log, not the callback.
    assert!(session.command().is_empty());
    assert!(session.log().is_empty());
    assert!(session.has_callback());
}

#[tokio::test]
async fn test_duration_override_wins_over_output() {
    let harness = TestHarness::new(CONVERTING);
    let mut session = Session::new();
    session.command_mut().append(script_arg(&harness.script));
    session
        .convert("in.avi", Some(OutputTarget::parse("mp4")), |s| {
            s.option(MainOption::Duration("00:00:08".to_string()))?;
            Ok(())
        })
        .unwrap();

    let summary = harness.driver(30).run(&mut session).await.unwrap();
    assert_eq!(summary.duration_secs, Some(8.0));
    assert_eq!(session.duration_override(), Some(8.0));
}

#[tokio::test]
async fn test_non_zero_exit_is_an_error() {
    let harness = TestHarness::new(
        r#"
printf 'in.avi: No such file or directory\n' >&2
printf 'Error opening input files: No such file or directory\n' >&2
exit 3
"#,
    );
    let mut session = harness.session();

    let err = harness.driver(30).run(&mut session).await.unwrap_err();
    assert_eq!(err.exit_code(), 3);
    match err {
        DriverError::ProcessFailed { code, output } => {
            assert_eq!(code, Some(3));
            assert!(output.unwrap().contains("Error opening input files"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(session.command().is_empty());
    assert!(session.log().is_empty());
}

#[tokio::test]
async fn test_timeout_kills_process() {
    let harness = TestHarness::new("exec sleep 10\n");
    let mut session = harness.session();

    let start = Instant::now();
    let err = harness.driver(1).run(&mut session).await.unwrap_err();

    assert!(matches!(err, DriverError::Timeout { timeout_secs: 1 }));
    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(session.command().is_empty());
}

#[tokio::test]
async fn test_cancel_from_callback() {
    let harness = TestHarness::new(
        r#"
printf 'frame=1 time=00:00:01.00 bitrate=1k\r' >&2
exec sleep 10
"#,
    );
    let mut session = harness.session();

    let cancel = CancelHandle::new();
    let trigger = cancel.clone();
    session.while_converting(move |_| trigger.cancel());

    let start = Instant::now();
    let err = harness
        .driver(30)
        .run_with_cancel(&mut session, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, DriverError::Cancelled));
    assert_eq!(err.exit_code(), 130);
    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(session.log().is_empty());
}

#[tokio::test]
async fn test_cancel_from_another_task() {
    let harness = TestHarness::new("exec sleep 10\n");
    let mut session = harness.session();

    let cancel = CancelHandle::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = harness
        .driver(30)
        .run_with_cancel(&mut session, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, DriverError::Cancelled));
}

#[tokio::test]
async fn test_session_is_reusable_after_run() {
    let harness = TestHarness::new("exit 0\n");
    let driver = harness.driver(30);
    let mut session = harness.session();

    driver.run(&mut session).await.unwrap();

    session
        .convert("next.avi", Some(OutputTarget::parse("/tmp/out.mkv")), |_| Ok(()))
        .unwrap();
    assert_eq!(driver.render(&session), "/bin/sh -i next.avi /tmp/out.mkv");
}

#[tokio::test]
async fn test_extra_args_reach_the_process() {
    let harness = TestHarness::new("printf 'argv: %s\\n' \"$*\" >&2\n");
    let driver = ProcessDriver::new(
        DriverConfig::with_path("/bin/sh")
            .with_timeout(30)
            .with_extra_args(vec!["-loglevel info".to_string()]),
    );

    let mut session = Session::new();
    session.command_mut().append(script_arg(&harness.script));
    driver
        .convert(&mut session, "in.avi", Some(OutputTarget::parse("mp4")), |s| {
            s.option(MainOption::Overwrite)?;
            Ok(())
        })
        .unwrap();

    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);
    session.while_converting(move |progress| {
        if let Some(entry) = progress.log().entries().last() {
            sink.lock().unwrap().push(entry.raw_text.clone());
        }
    });

    driver.run(&mut session).await.unwrap();

    let captured = captured.lock().unwrap();
    assert_eq!(*captured, vec!["argv: -i in.avi -y -loglevel info in.mp4"]);
}
