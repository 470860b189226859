//! Command-line argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Drive ffmpeg conversions with live progress and ETA.
#[derive(Parser, Debug)]
#[command(name = "ffconvert")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ./ffconvert.toml when present)
    #[arg(long, global = true, env = "FFCONVERT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a file and report progress while ffmpeg runs
    Convert(ConvertArgs),
    /// Print the ffmpeg command line without running it
    Render(BuildArgs),
}

/// Options shared by every command that builds an ffmpeg invocation
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Input file path
    #[arg(short, long)]
    pub input: String,

    /// Output path, or a media extension such as `mp4` to reuse the input name
    #[arg(long)]
    pub to: Option<String>,

    /// Overwrite the output file without asking
    #[arg(short = 'y', long = "overwrite")]
    pub overwrite: bool,

    /// Limit the output duration (HH:MM:SS[.ff], MM:SS or seconds)
    #[arg(long)]
    pub duration: Option<String>,

    /// Seek in the input before converting
    #[arg(long)]
    pub seek: Option<String>,

    /// Input time offset
    #[arg(long)]
    pub offset: Option<String>,

    /// Stop writing after this many bytes
    #[arg(long = "fs", value_name = "BYTES")]
    pub file_size_limit: Option<u64>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub author: Option<String>,

    #[arg(long)]
    pub copyright: Option<String>,

    #[arg(long)]
    pub comment: Option<String>,

    /// ffmpeg executable (overrides ffmpeg.path)
    #[arg(long, value_name = "PATH")]
    pub ffmpeg: Option<PathBuf>,

    /// Extra ffmpeg arguments, placed before the output file
    #[arg(last = true, value_name = "FFMPEG_ARGS")]
    pub raw: Vec<String>,
}

/// Arguments for the convert command
#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Kill ffmpeg after this many seconds (overrides ffmpeg.timeout_secs)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print the command instead of running it
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not draw the progress line
    #[arg(long)]
    pub no_progress: bool,
}
