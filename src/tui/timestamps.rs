use chrono::{DateTime, Datelike, Local, Utc};

/// Tiered timestamp for list rows:
/// - under a week: "just now", "12m ago", "3h ago", "5d ago"
/// - older: "Jan 15", or "Dec 3, 2024" outside the current year
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    format_timestamp_at(timestamp, &Utc::now())
}

pub fn format_timestamp_at(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(*timestamp);
    if elapsed.num_days() < 7 {
        return format_relative(elapsed.num_seconds().max(0));
    }

    let local = timestamp.with_timezone(&Local);
    if local.year() == now.with_timezone(&Local).year() {
        local.format("%b %-d").to_string()
    } else {
        local.format("%b %-d, %Y").to_string()
    }
}

/// Missing or out-of-range instants render as "unknown"
pub fn format_millis(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|ts| format_timestamp(&ts))
        .unwrap_or_else(|| "unknown".to_string())
}

fn format_relative(seconds: i64) -> String {
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{}d ago", days)
    } else if hours > 0 {
        format!("{}h ago", hours)
    } else if minutes > 0 {
        format!("{}m ago", minutes)
    } else {
        "just now".to_string()
    }
}
