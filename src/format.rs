//! Display helpers for counters and post dates.

use chrono::{DateTime, Utc};

/// Format a counter with thousands separators (`1234567` → `1,234,567`).
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Human-readable age of a post relative to `now`.
///
/// Anything older than thirty days is shown as a plain date.
pub fn since_label(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(published);

    let minutes = age.num_minutes();
    let hours = age.num_hours();
    let days = age.num_days();

    if minutes < 1 {
        "moments ago".to_string()
    } else if hours < 1 {
        plural(minutes, "minute")
    } else if days < 1 {
        plural(hours, "hour")
    } else if days < 30 {
        plural(days, "day")
    } else {
        published.format("%Y-%m-%d").to_string()
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}
