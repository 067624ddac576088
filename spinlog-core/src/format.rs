//! Formatting helpers shared by the charts and the CLI.

use chrono::{DateTime, TimeZone, Timelike};

/// Format listened minutes (e.g., "45m", "2h 5m").
pub fn format_minutes(minutes: u64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    match (hours, mins) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

/// Format a play count compactly (e.g., "999", "1.2K", "3.4M").
///
/// Counts that would round to "1000.0K" are shown in millions.
pub fn format_count(count: u64) -> String {
    if count >= 999_950 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

/// Hour axis label in the timestamp's own calendar (e.g., "1PM", "12AM").
pub fn hour_label<Tz>(ts: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let (pm, hour) = ts.hour12();
    format!("{}{}", hour, if pm { "PM" } else { "AM" })
}

/// Day axis label in the timestamp's own calendar (e.g., "Jan 5").
pub fn day_label<Tz>(ts: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    ts.format("%b %-d").to_string()
}

/// Format a timestamp as relative time (e.g., "2m ago").
pub fn format_relative_time<Tz>(ts: &DateTime<Tz>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let duration = now.clone().signed_duration_since(ts.clone());

    if duration.num_seconds() < 60 {
        "just now".to_string()
    } else if duration.num_minutes() < 60 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_days() < 7 {
        format!("{}d ago", duration.num_days())
    } else {
        ts.format("%b %d").to_string()
    }
}
