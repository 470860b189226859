//! Main conversion options and output naming.
//!
//! Only the general-purpose options live here; codec, resolution and other
//! per-feature flags are passed through as [`MainOption::Raw`] tokens.

use std::path::Path;
use thiserror::Error;

use crate::estimator::colon_time_to_seconds;

/// Session operations that a custom option name must not shadow.
pub const RESERVED_NAMES: &[&str] = &[
    "convert",
    "run",
    "while_converting",
    "current_eta",
    "current_progress",
    "log",
    "clear_log",
    "set_duration_override",
];

/// Errors raised while configuring a conversion.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionError {
    /// A time value could not be parsed.
    #[error("Invalid time value '{value}': expected HH:MM:SS[.ff], MM:SS or seconds")]
    InvalidTime { value: String },

    /// A custom option name collides with a session operation.
    #[error("Option name '{name}' is reserved")]
    ReservedName { name: String },
}

/// Rejects option names that collide with [`RESERVED_NAMES`].
pub fn check_reserved(name: &str) -> Result<(), OptionError> {
    if RESERVED_NAMES.contains(&name) {
        return Err(OptionError::ReservedName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// A main option and the tokens it contributes.
#[derive(Debug, Clone, PartialEq)]
pub enum MainOption {
    /// Overwrite the output file without asking (`-y`).
    Overwrite,
    /// Limit the output duration (`-t`). Also fixes the duration used for ETA.
    Duration(String),
    /// Stop writing after this many bytes (`-fs`).
    FileSizeLimit(u64),
    /// Seek in the input before converting (`-ss`).
    Seek(String),
    /// Input time offset (`-itsoffset`).
    Offset(String),
    Title(String),
    Author(String),
    Copyright(String),
    Comment(String),
    /// Tokens appended verbatim.
    Raw(Vec<String>),
}

impl MainOption {
    /// Tokens this option appends to the command.
    pub fn tokens(&self) -> Result<Vec<String>, OptionError> {
        let tokens = match self {
            Self::Overwrite => vec!["-y".to_string()],
            Self::Duration(value) => vec![timed("-t", value)?],
            Self::FileSizeLimit(bytes) => vec![format!("-fs {}", bytes)],
            Self::Seek(value) => vec![timed("-ss", value)?],
            Self::Offset(value) => vec![timed("-itsoffset", value)?],
            Self::Title(value) => vec![format!("-title {}", quote(value))],
            Self::Author(value) => vec![format!("-author {}", quote(value))],
            Self::Copyright(value) => vec![format!("-copyright {}", quote(value))],
            Self::Comment(value) => vec![format!("-comment {}", quote(value))],
            Self::Raw(tokens) => tokens.clone(),
        };
        Ok(tokens)
    }

    /// Seconds this option pins the media duration to, if any.
    pub fn duration_override(&self) -> Result<Option<f64>, OptionError> {
        match self {
            Self::Duration(value) => parse_time(value).map(Some),
            _ => Ok(None),
        }
    }
}

/// Container and audio extensions [`OutputTarget::parse`] accepts as a
/// shortcut for "input name, new extension".
pub const KNOWN_EXTENSIONS: &[&str] = &[
    "3gp", "aac", "ac3", "aiff", "asf", "avi", "flac", "flv", "gif", "m4a", "m4v", "mkv",
    "mov", "mp2", "mp3", "mp4", "mpeg", "mpg", "mts", "ogg", "ogv", "opus", "ts", "vob",
    "wav", "webm", "wma", "wmv",
];

/// Where the converted file goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// An explicit output path.
    Path(String),
    /// Same path as the input with its extension swapped.
    Extension(String),
}

impl OutputTarget {
    /// Treats a known extension such as `mp4` or `.mp4` as an extension,
    /// anything else as a path.
    pub fn parse(value: &str) -> Self {
        let bare = value.strip_prefix('.').unwrap_or(value);
        let lower = bare.to_ascii_lowercase();
        if KNOWN_EXTENSIONS.contains(&lower.as_str()) {
            Self::Extension(bare.to_string())
        } else {
            Self::Path(value.to_string())
        }
    }

    /// The output file name for a given input.
    pub fn resolve(&self, input: &str) -> String {
        match self {
            Self::Path(path) => path.clone(),
            Self::Extension(ext) => {
                let current = Path::new(input)
                    .extension()
                    .map(|e| e.to_string_lossy().len() + 1)
                    .unwrap_or(0);
                format!("{}.{}", &input[..input.len() - current], ext)
            }
        }
    }
}

/// Wraps a value in single quotes for the command line.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn parse_time(value: &str) -> Result<f64, OptionError> {
    colon_time_to_seconds(value).ok_or_else(|| OptionError::InvalidTime {
        value: value.to_string(),
    })
}

fn timed(flag: &str, value: &str) -> Result<String, OptionError> {
    parse_time(value)?;
    Ok(format!("{} {}", flag, value.trim()))
}
