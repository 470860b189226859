//! ffconvert: run ffmpeg conversions with a live progress line and ETA.
//!
//! # Usage
//!
//! ```bash
//! ffconvert convert --input movie.avi --to mp4 -y
//! ffconvert convert -i talk.mov --to talk.mkv --duration 00:10:00 -- -c:v libx264
//! ffconvert render -i movie.avi --to webm --title "Holiday"
//! ```

mod args;
mod commands;
mod progress;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ffconvert_core::Config;

use args::{Cli, Commands};
use commands::{
    apply_overrides, execute_convert_command, execute_render_command, exit_code, load_cli_config,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = load_cli_config(cli.config.as_deref());
    let level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(&level, cli.log_json);

    let result = match config {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("Fatal error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

async fn run(command: Commands, config: Config) -> Result<()> {
    let config = apply_overrides(config, &command)?;

    match &command {
        Commands::Convert(args) => {
            info!("Using ffmpeg at {:?}", config.ffmpeg.path);
            execute_convert_command(args, &config).await
        }
        Commands::Render(args) => execute_render_command(args, &config),
    }
}

/// `RUST_LOG` wins over the configured level. Logs go to stderr so stdout
/// only carries command output.
fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
