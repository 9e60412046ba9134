//! Calendar dates and instants.
//!
//! Indivo documents carry both plain dates (`2020-01-01`) and full timestamps.
//! [`IndivoDate`] keeps the instant in UTC together with the precision it was
//! written with, so a date-only value is printed back as a date.
//!
//! Accepted input, tried in this order:
//!
//! | Input | Precision | Timezone |
//! |-------|-----------|----------|
//! | `2020-01-01` | date | UTC midnight |
//! | `2020-01-01T10:30:00Z`, `2020-01-01T10:30:00+02:00` | date-time | as given, normalized to UTC |
//! | `2020-01-01T10:30:00`, `2020-01-01T10:30:00.250` | date-time | UTC |
//! | `2020-01-01 10:30:00` | date-time | UTC |
//!
//! Anything else is rejected; no timezone is ever guessed from the local clock.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ParseError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Naive date-time layouts, interpreted as UTC.
const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// How much of the instant was present on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatePrecision {
    /// Calendar date only.
    Date,
    /// Date and time of day.
    DateTime,
}

/// A date or timestamp value, always held in UTC.
///
/// Equality and ordering compare the instant first; two values naming the
/// same instant with different precision are ordered date before date-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndivoDate {
    instant: DateTime<Utc>,
    precision: DatePrecision,
}

impl IndivoDate {
    /// Builds a date-only value. Returns `None` for an impossible calendar date.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::from_naive_date)
    }

    /// Builds a date-only value from a calendar date.
    pub fn from_naive_date(date: NaiveDate) -> Self {
        Self {
            instant: date.and_time(chrono::NaiveTime::MIN).and_utc(),
            precision: DatePrecision::Date,
        }
    }

    /// Builds a date-time value.
    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        Self {
            instant,
            precision: DatePrecision::DateTime,
        }
    }

    /// Parses one of the accepted wire formats.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ParseError::Empty);
        }

        if let Ok(date) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
            return Ok(Self::from_naive_date(date));
        }

        if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
            return Ok(Self::from_datetime(instant.with_timezone(&Utc)));
        }

        NAIVE_DATE_TIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .map(|naive| Self::from_datetime(naive.and_utc()))
            .ok_or_else(|| ParseError::InvalidDate(text.to_string()))
    }

    /// The instant in UTC. Date-only values sit at midnight.
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    /// The calendar date in UTC.
    pub fn date(&self) -> NaiveDate {
        self.instant.date_naive()
    }

    pub fn precision(&self) -> DatePrecision {
        self.precision
    }
}

impl fmt::Display for IndivoDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.precision {
            DatePrecision::Date => write!(f, "{}", self.instant.format(DATE_FORMAT)),
            DatePrecision::DateTime => f.write_str(
                &self
                    .instant
                    .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            ),
        }
    }
}

impl FromStr for IndivoDate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for IndivoDate {
    fn from(date: NaiveDate) -> Self {
        Self::from_naive_date(date)
    }
}

impl From<DateTime<Utc>> for IndivoDate {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::from_datetime(instant)
    }
}

impl Serialize for IndivoDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IndivoDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_date_only() {
        let date = IndivoDate::parse("2020-01-01").unwrap();
        assert_eq!(date.precision(), DatePrecision::Date);
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(date.to_string(), "2020-01-01");
    }

    #[test]
    fn test_parse_rfc3339_normalizes_to_utc() {
        let date = IndivoDate::parse("2020-01-01T10:30:00+02:00").unwrap();
        assert_eq!(
            date.instant(),
            Utc.with_ymd_and_hms(2020, 1, 1, 8, 30, 0).unwrap()
        );
        assert_eq!(date.to_string(), "2020-01-01T08:30:00Z");
    }

    #[test]
    fn test_parse_naive_datetime_is_utc() {
        let plain = IndivoDate::parse("2011-03-05T14:00:00").unwrap();
        let spaced = IndivoDate::parse("2011-03-05 14:00:00").unwrap();
        let expected = Utc.with_ymd_and_hms(2011, 3, 5, 14, 0, 0).unwrap();
        assert_eq!(plain.instant(), expected);
        assert_eq!(spaced, plain);
        assert_eq!(plain.precision(), DatePrecision::DateTime);
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let date = IndivoDate::parse("2011-03-05T14:00:00.250Z").unwrap();
        assert_eq!(date.to_string(), "2011-03-05T14:00:00.250Z");
    }

    #[test]
    fn test_parse_rejects_other_formats() {
        for input in ["01/02/2020", "2020-13-01", "yesterday", "2020-01-01T25:00:00"] {
            assert_eq!(
                IndivoDate::parse(input),
                Err(ParseError::InvalidDate(input.to_string())),
                "{input}"
            );
        }
        assert_eq!(IndivoDate::parse("   "), Err(ParseError::Empty));
    }

    #[test]
    fn test_ordering_is_by_instant() {
        let earlier = IndivoDate::parse("2019-12-31T23:59:59Z").unwrap();
        let later = IndivoDate::parse("2020-01-01").unwrap();
        assert!(earlier < later);
        assert_eq!(
            IndivoDate::from_ymd(2020, 1, 1).unwrap(),
            IndivoDate::parse("2020-01-01").unwrap()
        );
    }

    #[test]
    fn test_serde_as_string() {
        let date = IndivoDate::parse("2020-02-29").unwrap();
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "\"2020-02-29\"");
        let back: IndivoDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date);
    }
}
