//! Progress and ETA estimation over a [`TimestampLog`].
//!
//! Every query is recomputed from the log, so the answers always reflect the
//! records captured so far. Missing information never raises: an unknown
//! duration makes ETA and progress `None`, and a rate that cannot be measured
//! falls back to [`RATE_EPSILON`].
//!
//! The conversion rate is a recency-weighted average of the per-step rates
//! between consecutive progress samples: the step at position `k` (1-based,
//! oldest first) has weight `k`, so the newest measurement counts the most
//! while single noisy steps are still damped.

mod classifier;
mod time;

use serde::Serialize;

use crate::session::TimestampLog;

pub use classifier::{FfmpegOutputClassifier, LineKind, OutputClassifier};
pub use time::colon_time_to_seconds;

/// Rate used when no step rate can be measured.
pub const RATE_EPSILON: f64 = 1e-10;

/// A progress report extracted from the log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParsedSample {
    /// Seconds since the log was started.
    pub wall_secs: f64,
    /// Media position reported by the converter.
    pub media_secs: f64,
}

/// Point-in-time view of every estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub duration_secs: Option<f64>,
    pub position_secs: f64,
    pub rate: f64,
    pub eta_secs: Option<f64>,
    pub progress: Option<f64>,
    pub samples: usize,
}

/// Read-only estimator over a session's log.
#[derive(Clone, Copy)]
pub struct ProgressEstimator<'a> {
    log: &'a TimestampLog,
    duration_override: Option<f64>,
    classifier: &'a dyn OutputClassifier,
}

impl<'a> ProgressEstimator<'a> {
    pub fn new(
        log: &'a TimestampLog,
        duration_override: Option<f64>,
        classifier: &'a dyn OutputClassifier,
    ) -> Self {
        Self {
            log,
            duration_override,
            classifier,
        }
    }

    pub fn log(&self) -> &'a TimestampLog {
        self.log
    }

    /// Total media duration: the explicit override if set, otherwise the first
    /// duration announced in the log.
    pub fn duration(&self) -> Option<f64> {
        self.duration_override.or_else(|| {
            self.log
                .entries()
                .iter()
                .find_map(|entry| self.classifier.media_duration(&entry.raw_text))
        })
    }

    /// Progress samples in log order. Records without a position are skipped.
    pub fn samples(&self) -> Vec<ParsedSample> {
        self.log
            .entries()
            .iter()
            .filter_map(|entry| {
                self.classifier
                    .media_position(&entry.raw_text)
                    .map(|media_secs| ParsedSample {
                        wall_secs: entry.wall_secs(),
                        media_secs,
                    })
            })
            .collect()
    }

    /// Media position of the most recent sample, or 0 without samples.
    pub fn last_position(&self) -> f64 {
        self.log
            .entries()
            .iter()
            .rev()
            .find_map(|entry| self.classifier.media_position(&entry.raw_text))
            .unwrap_or(0.0)
    }

    /// Per-step rates aligned with [`samples`](Self::samples); slot 0 is 0.
    pub fn deltas(&self) -> Vec<f64> {
        step_rates(&self.samples())
    }

    /// Smoothed conversion rate in media seconds per wall second.
    pub fn rate(&self) -> f64 {
        weighted_rate(&self.deltas())
    }

    /// Estimated wall seconds until the whole duration has been processed.
    ///
    /// Goes negative once the position overtakes the duration; that is
    /// expected near the end of a run. While the position is stalled or
    /// moving backwards the rate is [`RATE_EPSILON`], so the ETA is very
    /// large but finite and positive rather than infinite or negative.
    pub fn eta(&self) -> Option<f64> {
        let duration = self.known_duration()?;
        Some((duration - self.last_position()) / self.rate())
    }

    /// Fraction of the duration processed so far. Not clamped to `[0, 1]`.
    pub fn progress(&self) -> Option<f64> {
        let duration = self.known_duration()?;
        Some(self.last_position() / duration)
    }

    /// Computes every estimate from a single pass over the log.
    pub fn snapshot(&self) -> ProgressSnapshot {
        let samples = self.samples();
        let duration_secs = self.known_duration();
        let position_secs = samples.last().map(|s| s.media_secs).unwrap_or(0.0);
        let rate = weighted_rate(&step_rates(&samples));

        ProgressSnapshot {
            duration_secs,
            position_secs,
            rate,
            eta_secs: duration_secs.map(|d| (d - position_secs) / rate),
            progress: duration_secs.map(|d| position_secs / d),
            samples: samples.len(),
        }
    }

    fn known_duration(&self) -> Option<f64> {
        self.duration()
            .filter(|secs| secs.is_finite() && *secs > 0.0)
    }
}

impl std::fmt::Debug for ProgressEstimator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressEstimator")
            .field("entries", &self.log.len())
            .field("duration_override", &self.duration_override)
            .finish()
    }
}

/// Instantaneous rate between each pair of consecutive samples.
///
/// The result has one slot per sample; slot 0 has no predecessor and is 0.
/// A step with no wall time between its samples repeats the previous rate.
pub fn step_rates(samples: &[ParsedSample]) -> Vec<f64> {
    let mut deltas = Vec::with_capacity(samples.len());
    if samples.is_empty() {
        return deltas;
    }

    deltas.push(0.0);
    for pair in samples.windows(2) {
        let wall = pair[1].wall_secs - pair[0].wall_secs;
        let delta = if wall > 0.0 {
            (pair[1].media_secs - pair[0].media_secs) / wall
        } else {
            deltas.last().copied().unwrap_or(0.0)
        };
        deltas.push(delta);
    }
    deltas
}

/// Recency-weighted mean of the step rates, skipping the placeholder slot 0.
///
/// `rate = Σ(delta_k * k) / Σ(k)` for `k = 1..N`. Returns [`RATE_EPSILON`]
/// when there is no step, or when the mean is not a positive finite number.
pub fn weighted_rate(deltas: &[f64]) -> f64 {
    let steps = deltas.get(1..).unwrap_or_default();
    if steps.is_empty() {
        return RATE_EPSILON;
    }

    let n = steps.len() as f64;
    let weighted: f64 = steps
        .iter()
        .enumerate()
        .map(|(i, delta)| delta * (i + 1) as f64)
        .sum();
    let rate = weighted / (n * (n + 1.0) / 2.0);

    if rate.is_finite() && rate > 0.0 {
        rate
    } else {
        RATE_EPSILON
    }
}
