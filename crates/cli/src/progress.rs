//! Progress line drawn on stderr while ffmpeg runs.

use std::time::{Duration, Instant};

use ffconvert_core::ProgressEstimator;

/// ETAs beyond this are shown as unknown. Early in a run the rate falls back
/// to a tiny epsilon and the raw ETA is astronomically large.
const MAX_DISPLAY_SECS: f64 = 100.0 * 3600.0;

/// Rate limiter for progress redraws.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last_draw: Option<Instant>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_draw: None,
        }
    }

    /// Returns true and records the draw if enough time has passed.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last_draw {
            Some(last) if now.saturating_duration_since(last) < self.min_interval => false,
            _ => {
                self.last_draw = Some(now);
                true
            }
        }
    }

    pub fn has_drawn(&self) -> bool {
        self.last_draw.is_some()
    }
}

/// One progress line for the estimator's current state.
pub fn progress_line(estimator: &ProgressEstimator<'_>) -> String {
    format_progress(
        estimator.progress(),
        estimator.eta(),
        estimator.last_position(),
    )
}

pub fn format_progress(progress: Option<f64>, eta: Option<f64>, position: f64) -> String {
    match progress {
        Some(progress) => format!(
            "{:5.1}%  time {}  eta {}",
            progress * 100.0,
            format_clock(position),
            eta.map(format_clock).unwrap_or_else(unknown_clock)
        ),
        None => format!("time {}  (duration unknown)", format_clock(position)),
    }
}

/// Formats seconds as `HH:MM:SS`.
pub fn format_clock(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 || secs > MAX_DISPLAY_SECS {
        return unknown_clock();
    }
    let total = secs.round() as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, total / 60 % 60, total % 60)
}

fn unknown_clock() -> String {
    "--:--:--".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "00:00:00");
        assert_eq!(format_clock(181.4), "00:03:01");
        assert_eq!(format_clock(3725.0), "01:02:05");
        assert_eq!(format_clock(1e10), "--:--:--");
        assert_eq!(format_clock(f64::NAN), "--:--:--");
        assert_eq!(format_clock(-3.0), "--:--:--");
    }

    #[test]
    fn test_format_progress() {
        assert_eq!(
            format_progress(Some(0.25), Some(90.0), 30.0),
            " 25.0%  time 00:00:30  eta 00:01:30"
        );
        assert_eq!(
            format_progress(Some(0.01), Some(1e11), 1.0),
            "  1.0%  time 00:00:01  eta --:--:--"
        );
        assert_eq!(
            format_progress(None, None, 12.0),
            "time 00:00:12  (duration unknown)"
        );
    }

    #[test]
    fn test_throttle() {
        let start = Instant::now();
        let mut throttle = Throttle::new(Duration::from_millis(250));
        assert!(!throttle.has_drawn());

        assert!(throttle.ready(start));
        assert!(!throttle.ready(start + Duration::from_millis(100)));
        assert!(throttle.ready(start + Duration::from_millis(300)));
        assert!(throttle.has_drawn());
    }

    #[test]
    fn test_throttle_zero_interval() {
        let start = Instant::now();
        let mut throttle = Throttle::new(Duration::ZERO);
        assert!(throttle.ready(start));
        assert!(throttle.ready(start));
    }
}
