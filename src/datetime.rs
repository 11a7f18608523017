//! Date/time utilities for Cirrus.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Convert a stored timestamp (SQLite `datetime('now')` or RFC3339) to an
/// RFC3339 string in UTC.
///
/// Returns the original string unchanged if it cannot be parsed.
pub fn to_rfc3339(datetime_str: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(datetime_str) {
        return dt.with_timezone(&Utc).to_rfc3339();
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%d %H:%M:%S") {
        return naive.and_utc().to_rfc3339();
    }

    datetime_str.to_string()
}
