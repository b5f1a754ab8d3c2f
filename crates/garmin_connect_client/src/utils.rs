//! Utility functions for timestamp parsing.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a GMT timestamp as the API writes it into UTC.
///
/// Accepts:
/// - `YYYY-MM-DD HH:MM:SS` (activity list `startTimeGMT`)
/// - `YYYY-MM-DDTHH:MM:SS[.f]` (sleep movement `startGMT`/`endGMT`)
/// - RFC3339 with an explicit offset
pub fn parse_gmt_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(ndt.and_utc());
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ndt.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    None
}

/// Convert an epoch timestamp in milliseconds to UTC.
pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}
