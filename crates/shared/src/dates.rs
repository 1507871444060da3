//! Calendar date normalization.
//!
//! Scheduled dates arrive as plain `YYYY-MM-DD` strings or as full timestamps.
//! Both are reduced to a `NaiveDate` taken from the date as written, so that
//! comparisons never shift a day through timezone conversion.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Canonical wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Error type for date normalization.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateParseError {
    #[error("Date is empty")]
    Empty,
    #[error("Unrecognized date: {0}")]
    Unrecognized(String),
}

/// Normalizes a date or timestamp string to a calendar day.
///
/// Accepted inputs:
/// - `2024-02-10`
/// - `2024-02-10T08:30:00` (naive timestamp)
/// - `2024-02-10T23:30:00-05:00` (RFC 3339, date taken in its own offset)
pub fn normalize_date(input: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DateParseError::Empty);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Ok(date);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.date_naive());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(timestamp.date());
        }
    }

    Err(DateParseError::Unrecognized(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_normalize_plain_date() {
        assert_eq!(normalize_date("2024-02-10"), Ok(day(2024, 2, 10)));
        assert_eq!(normalize_date(" 2024-02-29 "), Ok(day(2024, 2, 29)));
    }

    #[test]
    fn test_normalize_timestamp_keeps_written_date() {
        assert_eq!(
            normalize_date("2024-02-10T23:30:00-05:00"),
            Ok(day(2024, 2, 10))
        );
        assert_eq!(normalize_date("2024-02-10T00:15:00Z"), Ok(day(2024, 2, 10)));
        assert_eq!(normalize_date("2024-02-10T08:30:00"), Ok(day(2024, 2, 10)));
        assert_eq!(normalize_date("2024-02-10 08:30:00.250"), Ok(day(2024, 2, 10)));
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert_eq!(normalize_date(""), Err(DateParseError::Empty));
        assert!(matches!(
            normalize_date("10/02/2024"),
            Err(DateParseError::Unrecognized(_))
        ));
        assert!(normalize_date("2023-02-29").is_err());
    }
}
