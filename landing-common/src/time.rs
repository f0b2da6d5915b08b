//! Timestamp utilities
//!
//! Launch timestamps arrive as loosely formatted strings. Parsing never fails
//! hard: anything that cannot be read as a point in time becomes `None`, which
//! callers treat as the "unparseable" marker.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Naive layouts accepted after RFC 3339; all are interpreted as UTC.
const NAIVE_LAYOUTS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse a launch timestamp, coercing anything unreadable to `None`.
///
/// Accepts RFC 3339 (`2006-03-24T22:30:00.000Z`, any offset), a handful of
/// offset-less date-time layouts, and bare dates (midnight UTC).
pub fn parse_launch_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for layout in NAIVE_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, layout) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Render a timestamp the way tabular exports expect it: `2006-03-24 22:30:00+00:00`.
pub fn format_table_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%:z").to_string()
}
