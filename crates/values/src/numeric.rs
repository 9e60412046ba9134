//! Exact decimal numbers.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ParseError, Result};

/// A decimal number as written on the wire.
///
/// Backed by [`Decimal`] so `0.10` stays `0.10`: the scale is part of the
/// value's text and survives a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Numeric(Decimal);

impl Numeric {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Parses a plain decimal. Exponent notation is not accepted.
    pub fn parse(text: &str) -> Result<Self> {
        parse_decimal(text).map(Self)
    }
}

/// Shared decimal parser for numeric and unit values.
pub(crate) fn parse_decimal(text: &str) -> Result<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }
    Decimal::from_str(text).map_err(|_| ParseError::InvalidNumber(text.to_string()))
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Numeric {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<Decimal> for Numeric {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<i64> for Numeric {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

impl Serialize for Numeric {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Numeric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
