// Shared formatting helpers used by the renderer and CLI.

use chrono::{DateTime, SecondsFormat, Utc};
use std::time::Duration as StdDuration;

/// Format an integer with thousands separators (e.g. 12_345 -> "12,345").
pub fn format_number<T>(value: T) -> String
where
    T: std::fmt::Display,
{
    let s = value.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (idx, ch) in s.chars().rev().enumerate() {
        if idx > 0 && idx % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Format a usage "since" timestamp (second precision, UTC).
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a duration with auto-scaling units (μs/ms for < 1s, then s/m/h for longer).
pub fn format_std_duration_auto(duration: StdDuration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 0.001 {
        format!("{:.0}μs", secs * 1_000_000.0)
    } else if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        // HumanDuration handles m, h, etc.
        use indicatif::HumanDuration;
        HumanDuration(duration).to_string()
    }
}
