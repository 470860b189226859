//! Colon-separated time values ("HH:MM:SS.ff", "MM:SS", "SS").

/// Converts a colon-separated time value into seconds.
///
/// Components are read right to left, each worth 60x the one after it, so
/// `"00:03:01"` is 181 seconds and `"1:00:00.5"` is 3600.5 seconds. A bare
/// number is taken as seconds. Returns `None` for empty or non-numeric parts.
pub fn colon_time_to_seconds(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let mut seconds = 0.0;
    let mut scale = 1.0;
    for part in value.rsplit(':') {
        let number: f64 = part.trim().parse().ok()?;
        if !number.is_finite() || number.is_sign_negative() {
            return None;
        }
        seconds += number * scale;
        scale *= 60.0;
    }

    Some(seconds)
}
