//! Date/time text helpers for caller-provided schedule fields.
//!
//! Schedule fields are stored as the text callers send: either RFC 3339
//! (`2025-02-01T15:00:00.000Z`) or a local form without zone
//! (`2025-02-01T15:00`, optionally with seconds). Shifting keeps the shape.

use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat};

const LOCAL_MINUTES: &str = "%Y-%m-%dT%H:%M";
const LOCAL_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";

/// Shifts a date/time text by `delta`, keeping its textual format.
///
/// Returns `None` when `value` matches none of the accepted formats.
pub fn shift_datetime(value: &str, delta: Duration) -> Option<String> {
    let trimmed = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        let use_z = trimmed.ends_with('Z') || trimmed.ends_with('z');
        return Some((parsed + delta).to_rfc3339_opts(SecondsFormat::AutoSi, use_z));
    }

    for format in [LOCAL_SECONDS, LOCAL_MINUTES] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some((parsed + delta).format(format).to_string());
        }
    }

    None
}

/// Keeps the first `max_chars` characters of `value`.
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
