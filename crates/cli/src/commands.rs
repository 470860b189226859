//! Command execution

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use ffconvert_core::{
    load_config, load_config_or_default, validate_config, CancelHandle, Config, DriverError,
    MainOption, OptionError, OutputTarget, ProcessDriver, Session,
};

use crate::args::{BuildArgs, Commands, ConvertArgs};
use crate::progress::{progress_line, Throttle};

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_PATH: &str = "ffconvert.toml";

/// Loads configuration. An explicit path must exist; the default file is
/// optional.
pub fn load_cli_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path)),
        None => load_config_or_default(Some(Path::new(DEFAULT_CONFIG_PATH)))
            .context("Failed to load configuration"),
    }
}

/// Applies command-line overrides on top of the loaded configuration and
/// validates the result.
pub fn apply_overrides(mut config: Config, command: &Commands) -> Result<Config> {
    let (build, timeout) = match command {
        Commands::Convert(args) => (&args.build, args.timeout),
        Commands::Render(args) => (args, None),
    };

    if let Some(path) = &build.ffmpeg {
        config.ffmpeg.path = path.clone();
    }
    if let Some(timeout) = timeout {
        config.ffmpeg.timeout_secs = timeout;
    }

    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

/// Builds a session from the command-line options.
///
/// Options go in a fixed order, then the user's raw arguments, then the
/// driver's configured extra arguments, then the output file.
pub fn build_session(args: &BuildArgs, driver: &ProcessDriver) -> Result<Session, OptionError> {
    let target = args.to.as_deref().map(OutputTarget::parse);

    let mut session = Session::new();
    driver.convert(&mut session, &args.input, target, |s| {
        if args.overwrite {
            s.option(MainOption::Overwrite)?;
        }
        if let Some(value) = &args.seek {
            s.option(MainOption::Seek(value.clone()))?;
        }
        if let Some(value) = &args.offset {
            s.option(MainOption::Offset(value.clone()))?;
        }
        if let Some(value) = &args.duration {
            s.option(MainOption::Duration(value.clone()))?;
        }
        if let Some(bytes) = args.file_size_limit {
            s.option(MainOption::FileSizeLimit(bytes))?;
        }
        if let Some(value) = &args.title {
            s.option(MainOption::Title(value.clone()))?;
        }
        if let Some(value) = &args.author {
            s.option(MainOption::Author(value.clone()))?;
        }
        if let Some(value) = &args.copyright {
            s.option(MainOption::Copyright(value.clone()))?;
        }
        if let Some(value) = &args.comment {
            s.option(MainOption::Comment(value.clone()))?;
        }

        // Each raw argument is one word on our command line, keep it one
        // word for ffmpeg too.
        let raw: Vec<String> = args
            .raw
            .iter()
            .map(|arg| shell_words::quote(arg).into_owned())
            .collect();
        if !raw.is_empty() {
            s.option(MainOption::Raw(raw))?;
        }
        Ok(())
    })?;

    Ok(session)
}

/// Execute the render command
pub fn execute_render_command(args: &BuildArgs, config: &Config) -> Result<()> {
    let driver = ProcessDriver::new(config.ffmpeg.clone());
    let session = build_session(args, &driver)?;
    println!("{}", driver.render(&session));
    Ok(())
}

/// Execute the convert command
pub async fn execute_convert_command(args: &ConvertArgs, config: &Config) -> Result<()> {
    let driver = ProcessDriver::new(config.ffmpeg.clone());
    let mut session = build_session(&args.build, &driver)?;

    if args.dry_run {
        println!("{}", driver.render(&session));
        return Ok(());
    }

    let throttle = Arc::new(Mutex::new(Throttle::new(Duration::from_millis(
        config.progress.min_interval_ms,
    ))));
    if config.progress.enabled && !args.no_progress {
        let throttle = Arc::clone(&throttle);
        session.while_converting(move |estimator| {
            let Ok(mut throttle) = throttle.lock() else {
                return;
            };
            if throttle.ready(Instant::now()) {
                eprint!("\r{}", progress_line(estimator));
            }
        });
    }

    let cancel = CancelHandle::new();
    let listener = spawn_interrupt_listener(cancel.clone());
    let result = driver.run_with_cancel(&mut session, &cancel).await;
    listener.abort();

    if throttle.lock().map(|t| t.has_drawn()).unwrap_or(false) {
        eprintln!();
    }

    let summary = result?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!(
            "Converted {} in {:.1}s",
            args.build.input,
            summary.elapsed_ms as f64 / 1000.0
        );
    }
    Ok(())
}

/// Cancels the run on Ctrl+C.
fn spawn_interrupt_listener(cancel: CancelHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupted, stopping ffmpeg");
                cancel.cancel();
            }
            Err(e) => debug!("Failed to install Ctrl+C handler: {}", e),
        }
    })
}

/// Process exit code for a failed command.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<DriverError>()
        .map(DriverError::exit_code)
        .unwrap_or(1)
}
