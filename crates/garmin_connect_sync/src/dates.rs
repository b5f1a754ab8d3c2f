//! Calendar date helpers for the daily pull.

use crate::error::{SyncError, SyncResult};
use chrono::{Duration, Local, NaiveDate};

/// Parse a `YYYY-MM-DD` date. Two-digit years are rejected.
pub fn parse_date(s: &str) -> SyncResult<NaiveDate> {
    let valid_shape = s.len() == 10 && s.as_bytes()[4] == b'-' && s.as_bytes()[7] == b'-';
    if !valid_shape {
        return Err(SyncError::Validation(format!(
            "invalid date '{s}': expected YYYY-MM-DD"
        )));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| SyncError::Validation(format!("invalid date '{s}': {e}")))
}

/// The day before today on the local clock.
pub fn yesterday() -> NaiveDate {
    Local::now().date_naive() - Duration::days(1)
}

/// Every date from `start` through `end`, both included.
pub fn days(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}
