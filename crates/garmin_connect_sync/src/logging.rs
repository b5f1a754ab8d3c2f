//! Log filter selection for the `garmin-sync` binary.

use crate::error::{SyncError, SyncResult};

/// Per-target overrides appended to every filter; sqlx logs each statement at info.
pub const QUIET_TARGETS: &str = "sqlx=warn,hyper_util=warn";

/// Map a user supplied level name to a `tracing` level directive.
pub fn parse_level(level: &str) -> SyncResult<&'static str> {
    match level.to_ascii_uppercase().as_str() {
        "DEBUG" => Ok("debug"),
        "INFO" => Ok("info"),
        "WARNING" | "WARN" => Ok("warn"),
        "ERROR" => Ok("error"),
        _ => Err(SyncError::Validation(format!(
            "invalid log level '{level}': expected DEBUG, INFO, WARNING or ERROR"
        ))),
    }
}

/// Resolve the filter directive: `flag`, then `GARMIN_SYNC_LOG_LEVEL`, then
/// `RUST_LOG` (passed through as a raw directive), then `info`.
pub fn resolve_filter<F>(flag: Option<&str>, mut get: F) -> SyncResult<String>
where
    F: FnMut(&str) -> Option<String>,
{
    let base = if let Some(level) = flag {
        parse_level(level)?.to_string()
    } else if let Some(level) = get("GARMIN_SYNC_LOG_LEVEL") {
        parse_level(&level)?.to_string()
    } else if let Some(directive) = get("RUST_LOG") {
        directive
    } else {
        "info".to_string()
    };
    Ok(format!("{base},{QUIET_TARGETS}"))
}
