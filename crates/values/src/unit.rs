//! Quantities with a unit, such as doses and strengths.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ParseError, Result};
use crate::numeric::parse_decimal;

/// A decimal quantity and its unit, written `"<value> <unit>"` on the wire.
///
/// The unit is everything after the first run of whitespace, so `"2 tablets
/// daily"` has the unit `tablets daily`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitValue {
    value: Decimal,
    unit: String,
}

impl UnitValue {
    /// The unit is stored trimmed.
    pub fn new(value: Decimal, unit: impl Into<String>) -> Self {
        let unit = unit.into();
        let unit = match unit.trim() {
            inner if inner.len() == unit.len() => unit,
            inner => inner.to_string(),
        };
        Self { value, unit }
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ParseError::Empty);
        }

        match text.split_once(char::is_whitespace) {
            Some((number, unit)) => {
                let value = parse_decimal(number)?;
                let unit = unit.trim();
                if unit.is_empty() {
                    return Err(ParseError::MissingUnit(text.to_string()));
                }
                Ok(Self::new(value, unit))
            }
            // A bare number is a missing unit; anything else is a bad number.
            None => match parse_decimal(text) {
                Ok(_) => Err(ParseError::MissingUnit(text.to_string())),
                Err(err) => Err(err),
            },
        }
    }
}

impl fmt::Display for UnitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

impl FromStr for UnitValue {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for UnitValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UnitValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
