//! Errors raised while parsing scalar wire values.

use thiserror::Error;

/// A scalar wire value that could not be turned into its typed form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A coded value without its `code` part.
    #[error("coded value has no code")]
    MissingCode,

    /// The numeric part of a value is not a valid decimal.
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    /// A unit value that carries a number but no unit.
    #[error("unit value {0:?} has no unit")]
    MissingUnit(String),

    /// The text does not match any accepted date format.
    #[error("invalid date: {0:?}")]
    InvalidDate(String),

    /// The wire text was blank.
    #[error("empty value")]
    Empty,
}

/// Result alias for scalar parsing.
pub type Result<T> = std::result::Result<T, ParseError>;
