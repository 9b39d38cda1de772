//! Time utilities: ERDDAP timestamp parsing and report formatting.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Parse an ERDDAP ISO-8601 time (`2024-05-27T12:34:56Z`, offset optional).
pub fn parse_erddap_time(s: &str) -> AppResult<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|n| Utc.from_utc_datetime(&n))
        .map_err(|_| AppError::InvalidTime(s.to_string()))
}

/// Unix epoch seconds to UTC.
pub fn from_epoch(secs: i64) -> AppResult<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| AppError::InvalidTime(secs.to_string()))
}

/// Minute-precision timestamp used throughout reports.
pub fn format_minute(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M").to_string()
}

/// Hours rounded to one decimal, as printed in lag lines.
pub fn format_hours(hours: f64) -> String {
    format!("{:.1}", hours)
}
