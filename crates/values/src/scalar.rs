//! The closed set of scalar value kinds.

use std::fmt;

use crate::coded::CodedValue;
use crate::date::IndivoDate;
use crate::error::{ParseError, Result};
use crate::numeric::Numeric;
use crate::unit::UnitValue;

/// Tag naming which [`ScalarValue`] variant a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Date,
    String,
    CodedValue,
    UnitValue,
    Numeric,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 5] = [
        ScalarKind::Date,
        ScalarKind::String,
        ScalarKind::CodedValue,
        ScalarKind::UnitValue,
        ScalarKind::Numeric,
    ];

    /// Whether the whole value fits in one piece of text.
    ///
    /// Coded values carry several parts and need an element of their own.
    pub fn is_textual(self) -> bool {
        !matches!(self, ScalarKind::CodedValue)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScalarKind::Date => "Date",
            ScalarKind::String => "String",
            ScalarKind::CodedValue => "CodedValue",
            ScalarKind::UnitValue => "UnitValue",
            ScalarKind::Numeric => "Numeric",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable clinical scalar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarValue {
    Date(IndivoDate),
    String(String),
    CodedValue(CodedValue),
    UnitValue(UnitValue),
    Numeric(Numeric),
}

impl ScalarValue {
    pub fn kind(&self) -> ScalarKind {
        match self {
            ScalarValue::Date(_) => ScalarKind::Date,
            ScalarValue::String(_) => ScalarKind::String,
            ScalarValue::CodedValue(_) => ScalarKind::CodedValue,
            ScalarValue::UnitValue(_) => ScalarKind::UnitValue,
            ScalarValue::Numeric(_) => ScalarKind::Numeric,
        }
    }

    /// Parses a value of `kind` from its text form.
    ///
    /// The text form of a coded value is its bare code. Strings are taken
    /// as-is, including surrounding whitespace.
    pub fn parse_text(kind: ScalarKind, text: &str) -> Result<Self> {
        Ok(match kind {
            ScalarKind::Date => ScalarValue::Date(IndivoDate::parse(text)?),
            ScalarKind::String => ScalarValue::String(text.to_string()),
            ScalarKind::CodedValue => {
                ScalarValue::CodedValue(CodedValue::from_parts(Some(text), None, None)?)
            }
            ScalarKind::UnitValue => ScalarValue::UnitValue(UnitValue::parse(text)?),
            ScalarKind::Numeric => ScalarValue::Numeric(Numeric::parse(text)?),
        })
    }

    /// Checks that the value can be written and read back unchanged.
    ///
    /// An empty string, a blank code and a unit value without a unit have no
    /// wire form; they would read back as absent or fail to parse.
    pub fn check_wire_form(&self) -> Result<()> {
        match self {
            ScalarValue::String(text) if text.is_empty() => Err(ParseError::Empty),
            ScalarValue::CodedValue(coded) => coded.check_code(),
            ScalarValue::UnitValue(unit) if unit.unit().is_empty() => {
                Err(ParseError::MissingUnit(unit.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// The text form of the value; for a coded value this is its code.
    pub fn to_text(&self) -> String {
        match self {
            ScalarValue::Date(date) => date.to_string(),
            ScalarValue::String(text) => text.clone(),
            ScalarValue::CodedValue(coded) => coded.code().to_string(),
            ScalarValue::UnitValue(unit) => unit.to_string(),
            ScalarValue::Numeric(number) => number.to_string(),
        }
    }

    pub fn as_date(&self) -> Option<&IndivoDate> {
        match self {
            ScalarValue::Date(date) => Some(date),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_coded_value(&self) -> Option<&CodedValue> {
        match self {
            ScalarValue::CodedValue(coded) => Some(coded),
            _ => None,
        }
    }

    pub fn as_unit_value(&self) -> Option<&UnitValue> {
        match self {
            ScalarValue::UnitValue(unit) => Some(unit),
            _ => None,
        }
    }

    pub fn as_numeric(&self) -> Option<&Numeric> {
        match self {
            ScalarValue::Numeric(number) => Some(number),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::CodedValue(coded) => fmt::Display::fmt(coded, f),
            ScalarValue::String(text) => f.write_str(text),
            other => f.write_str(&other.to_text()),
        }
    }
}

impl From<IndivoDate> for ScalarValue {
    fn from(value: IndivoDate) -> Self {
        ScalarValue::Date(value)
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::String(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::String(value.to_string())
    }
}

impl From<CodedValue> for ScalarValue {
    fn from(value: CodedValue) -> Self {
        ScalarValue::CodedValue(value)
    }
}

impl From<UnitValue> for ScalarValue {
    fn from(value: UnitValue) -> Self {
        ScalarValue::UnitValue(value)
    }
}

impl From<Numeric> for ScalarValue {
    fn from(value: Numeric) -> Self {
        ScalarValue::Numeric(value)
    }
}
