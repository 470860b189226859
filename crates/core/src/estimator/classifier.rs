//! Recognises the records of interest in the converter's streamed output.
//!
//! The estimator never looks at raw text itself; it asks an
//! [`OutputClassifier`] for the total media duration and the current media
//! position carried by a record. Swapping the classifier is how the patterns
//! are adapted to a different tool or tool version.

use regex_lite::Regex;

use super::time::colon_time_to_seconds;

/// What a single output record tells the estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineKind {
    /// Total media length, in seconds.
    Duration(f64),
    /// Current encoded position, in seconds.
    Position(f64),
    /// Anything else: stored in the log but ignored by the estimator.
    Other,
}

/// Extracts timing information from output records.
pub trait OutputClassifier: Send + Sync {
    /// Total media duration announced by this record, if any.
    fn media_duration(&self, text: &str) -> Option<f64>;

    /// Current media position reported by this record, if any.
    fn media_position(&self, text: &str) -> Option<f64>;

    /// Classifies a record. A record announcing the duration wins over a
    /// progress report when both are present.
    fn classify(&self, text: &str) -> LineKind {
        if let Some(secs) = self.media_duration(text) {
            LineKind::Duration(secs)
        } else if let Some(secs) = self.media_position(text) {
            LineKind::Position(secs)
        } else {
            LineKind::Other
        }
    }
}

/// Classifier for ffmpeg's console output.
///
/// Understands `Duration: HH:MM:SS.ff` in the input banner and `time=<t> ` in
/// the status line, where `<t>` is either plain seconds (older releases) or
/// `HH:MM:SS.ff` (current releases). The trailing space after the time value
/// is required.
pub struct FfmpegOutputClassifier {
    duration_regex: Option<Regex>,
    time_regex: Option<Regex>,
}

impl FfmpegOutputClassifier {
    pub fn new() -> Self {
        Self {
            duration_regex: Regex::new(r"Duration: (\d+:\d{2}:\d{2}(?:\.\d+)?)").ok(),
            time_regex: Regex::new(r"time=(\d+:\d{2}:\d{2}(?:\.\d+)?|\d+(?:\.\d+)?) ").ok(),
        }
    }
}

impl Default for FfmpegOutputClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FfmpegOutputClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegOutputClassifier").finish_non_exhaustive()
    }
}

impl OutputClassifier for FfmpegOutputClassifier {
    fn media_duration(&self, text: &str) -> Option<f64> {
        let re = self.duration_regex.as_ref()?;
        let caps = re.captures(text)?;
        colon_time_to_seconds(caps.get(1)?.as_str())
    }

    fn media_position(&self, text: &str) -> Option<f64> {
        let re = self.time_regex.as_ref()?;
        // A record normally carries one status line; take the latest if not.
        let caps = re.captures_iter(text).last()?;
        colon_time_to_seconds(caps.get(1)?.as_str())
    }
}
