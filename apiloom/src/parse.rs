//! Literal parsing shared by every surface

use crate::error::{ArgsError, ArgsResult};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Format accepted for date parameters
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` literal as midnight UTC
pub fn parse_date(name: &str, raw: &str) -> ArgsResult<DateTime<Utc>> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|source| ArgsError::InvalidDate {
            name: name.to_string(),
            value: raw.to_string(),
            source,
        })
}

/// Parse a base-10 integer literal
pub fn parse_int(name: &str, raw: &str) -> ArgsResult<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().map_err(|source| ArgsError::InvalidInt {
        name: name.to_string(),
        value: raw.to_string(),
        source,
    })
}

pub fn format_date(value: &DateTime<Utc>) -> String {
    value.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_date() {
        let date = parse_date("day", "2024-02-29").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 2, 29));
        assert_eq!(date.hour(), 0);
        assert_eq!(format_date(&date), "2024-02-29");
    }

    #[test]
    fn test_parse_date_rejects_other_formats() {
        for raw in ["02/29/2024", "2024-13-01", "yesterday", ""] {
            let err = parse_date("day", raw).unwrap_err();
            assert!(
                matches!(err, ArgsError::InvalidDate { ref name, .. } if name == "day"),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("id", "42").unwrap(), 42);
        assert_eq!(parse_int("id", " -7 ").unwrap(), -7);

        let err = parse_int("id", "abc").unwrap_err();
        assert_eq!(err.to_string(), "invalid integer for id: 'abc'");
    }
}
