// ── Display formatting ──
//
// Timestamps are shown in the viewer's local zone; the appliance stores
// UTC.

use chrono::{DateTime, Local, Utc};

/// Absolute date and time, e.g. `2024-06-15 12:30:00`.
pub fn format_date(value: DateTime<Utc>) -> String {
    value
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Clock time only, e.g. `12:30:00`.
pub fn format_time(value: DateTime<Utc>) -> String {
    value.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Hour-and-minute label for chart axes.
pub fn format_hour(value: DateTime<Utc>) -> String {
    value.with_timezone(&Local).format("%H:%M").to_string()
}

/// "Just now", "3 minutes ago", ... falling back to the absolute date
/// after a week.
pub fn format_relative_time(value: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - value).num_seconds();
    let mins = secs / 60;
    let hours = mins / 60;
    let days = hours / 24;

    if secs < 60 {
        "Just now".into()
    } else if mins < 60 {
        plural(mins, "minute")
    } else if hours < 24 {
        plural(hours, "hour")
    } else if days < 7 {
        plural(days, "day")
    } else {
        format_date(value)
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

/// Compact counts: `1.5K`, `2.3M`.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn format_number(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// A 0..=1 fraction as a one-decimal percentage.
pub fn format_percentage(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}
