//! # Temporal Types — UTC-Only Timestamps
//!
//! Defines `Timestamp`, a UTC timestamp truncated to seconds precision.
//! Session timestamps, classification times, and report dates all flow
//! through this type so the exported report renders every instant as
//! `YYYY-MM-DDTHH:MM:SSZ`.
//!
//! The remote registry emits offsets such as `+00:00` and microsecond
//! precision; [`Timestamp::parse`] accepts any RFC 3339 offset and
//! normalizes to UTC.

use chrono::{DateTime, Months, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AiraError;

/// A UTC timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 string with any offset, converting to UTC.
    pub fn parse(s: &str) -> Result<Self, AiraError> {
        let dt = DateTime::parse_from_rfc3339(s.trim()).map_err(|e| AiraError::InvalidTimestamp {
            value: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// The calendar date (UTC) of this instant.
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// The calendar date `months` months after this instant.
    ///
    /// Month arithmetic clamps to the last day of shorter months
    /// (31 January + 1 month = 28/29 February). Returns `None` only when
    /// the result leaves chrono's representable range.
    pub fn date_plus_months(&self, months: u32) -> Option<NaiveDate> {
        self.date().checked_add_months(Months::new(months))
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_offset_to_utc() {
        let ts = Timestamp::parse("2026-01-15T17:30:00+05:30").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn parse_truncates_microseconds() {
        let ts = Timestamp::parse("2026-03-01T08:15:42.123456+00:00").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-03-01T08:15:42Z");
    }

    #[test]
    fn parse_rejects_non_rfc3339() {
        assert!(Timestamp::parse("yesterday").is_err());
    }

    #[test]
    fn month_offsets_clamp_to_month_end() {
        let ts = Timestamp::parse("2026-01-31T09:00:00Z").unwrap();
        assert_eq!(
            ts.date_plus_months(1),
            NaiveDate::from_ymd_opt(2026, 2, 28)
        );
        assert_eq!(
            ts.date_plus_months(12),
            NaiveDate::from_ymd_opt(2027, 1, 31)
        );
    }

    #[test]
    fn zero_month_offset_is_same_date() {
        let ts = Timestamp::parse("2026-10-19T23:59:59Z").unwrap();
        assert_eq!(ts.date_plus_months(0), Some(ts.date()));
    }
}
