//! ISO-8601 timestamp parsing shared by the date filters and the SLA engine.
//!
//! Seeds carry naive local-less stamps such as `2024-03-01T09:30:00` or
//! `2024-03-01T09:30:00.123456`. Offsets are accepted and folded into UTC so
//! every comparison happens on one naive UTC timeline.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::ErrorCode;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A timestamp that matched none of the accepted ISO-8601 shapes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}: invalid ISO-8601 timestamp '{raw}'", ErrorCode::InvalidTimestamp.code())]
pub struct TimestampError {
    pub raw: String,
}

impl TimestampError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::InvalidTimestamp
    }
}

/// Parse an ISO-8601 timestamp into naive UTC.
///
/// # Errors
///
/// Returns [`TimestampError`] when the text is not a recognised timestamp.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, TimestampError> {
    let text = raw.trim();

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(parsed);
        }
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(parsed.with_timezone(&Utc).naive_utc());
    }

    if let Some(midnight) = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight);
    }

    Err(TimestampError {
        raw: raw.to_string(),
    })
}

/// Current UTC time as naive UTC.
#[must_use]
pub fn now_utc() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Render a naive UTC instant in the seed's ISO form.
#[must_use]
pub fn format_iso(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Current UTC time rendered in the seed's ISO form.
#[must_use]
pub fn now_iso() -> String {
    format_iso(now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn parses_naive_iso_forms() {
        assert_eq!(
            parse_timestamp("2024-01-05T10:20:30").unwrap(),
            at(2024, 1, 5, 10, 20, 30)
        );
        assert_eq!(
            parse_timestamp("2024-01-05 10:20:30").unwrap(),
            at(2024, 1, 5, 10, 20, 30)
        );
        let fractional = parse_timestamp("2024-01-05T10:20:30.250000").unwrap();
        assert_eq!(fractional.and_utc().timestamp_subsec_millis(), 250);
    }

    #[test]
    fn bare_date_is_midnight() {
        assert_eq!(parse_timestamp("2024-01-05").unwrap(), at(2024, 1, 5, 0, 0, 0));
    }

    #[test]
    fn offsets_are_folded_into_utc() {
        assert_eq!(
            parse_timestamp("2024-01-05T12:00:00+02:00").unwrap(),
            at(2024, 1, 5, 10, 0, 0)
        );
        assert_eq!(
            parse_timestamp("2024-01-05T12:00:00Z").unwrap(),
            at(2024, 1, 5, 12, 0, 0)
        );
    }

    #[test]
    fn garbage_is_an_error_naming_the_input() {
        let err = parse_timestamp("last tuesday").unwrap_err();
        assert_eq!(err.raw, "last tuesday");
        assert!(err.to_string().contains("E2003"));
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn format_roundtrips_through_parse() {
        let instant = at(2023, 12, 31, 23, 59, 59);
        assert_eq!(parse_timestamp(&format_iso(instant)).unwrap(), instant);
    }
}
