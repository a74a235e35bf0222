//! Display labels for the note list and status bar.

use chrono::{DateTime, Utc};

/// Formats `then` relative to `now`: "just now", "5 minutes ago",
/// "yesterday", "in 3 days".
///
/// Units cascade seconds -> minutes -> hours -> days, each rounded half up,
/// and the largest unit with a magnitude of at least one wins.
pub fn relative_stamp(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff_ms = (then - now).num_milliseconds() as f64;
    let seconds = round_half_up(diff_ms / 1000.0);
    let minutes = round_half_up(seconds / 60.0);
    let hours = round_half_up(minutes / 60.0);
    let days = round_half_up(hours / 24.0);

    if days.abs() >= 1.0 {
        return relative_phrase(days as i64, "day");
    }
    if hours.abs() >= 1.0 {
        return relative_phrase(hours as i64, "hour");
    }
    if minutes.abs() >= 1.0 {
        return relative_phrase(minutes as i64, "minute");
    }
    "just now".to_string()
}

fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn relative_phrase(value: i64, unit: &str) -> String {
    match (unit, value) {
        ("day", -1) => return "yesterday".to_string(),
        ("day", 1) => return "tomorrow".to_string(),
        _ => {}
    }
    let magnitude = value.unsigned_abs();
    let noun = if magnitude == 1 {
        unit.to_string()
    } else {
        format!("{unit}s")
    };
    if value < 0 {
        format!("{magnitude} {noun} ago")
    } else {
        format!("in {magnitude} {noun}")
    }
}

/// `"1 char"`, `"12 chars"`.
pub fn count_label(count: usize, singular: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {singular}s")
    }
}
