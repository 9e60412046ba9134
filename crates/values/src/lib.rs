//! # Indivo scalar values
//!
//! Immutable wrappers for the primitive clinical values carried by Indivo
//! documents. Every type parses from the text it has on the wire and prints
//! back to the same text, so a value read from the service can be written out
//! again without drift.
//!
//! | Type | Wire text | Example |
//! |------|-----------|---------|
//! | [`IndivoDate`] | `YYYY-MM-DD` or RFC 3339 | `2020-01-01`, `2020-01-01T10:30:00Z` |
//! | [`UnitValue`] | `<decimal> <unit>` | `10 mg` |
//! | [`Numeric`] | decimal | `0.25` |
//! | [`CodedValue`] | code plus optional system and display text | `123` / `rxnorm` / `Aspirin` |
//! | `String` | free text | `take with food` |
//!
//! [`ScalarValue`] is the closed variant over all of them and [`ScalarKind`]
//! its tag. The tag of a value is fixed when the value is built.
//!
//! ```
//! use indivo_values::{ScalarKind, ScalarValue, UnitValue};
//!
//! let dose: UnitValue = "5 mg".parse()?;
//! assert_eq!(dose.unit(), "mg");
//!
//! let value = ScalarValue::parse_text(ScalarKind::UnitValue, "5 mg")?;
//! assert_eq!(value.kind(), ScalarKind::UnitValue);
//! # Ok::<(), indivo_values::ParseError>(())
//! ```

pub mod coded;
pub mod date;
pub mod error;
pub mod numeric;
pub mod scalar;
pub mod unit;

pub use coded::CodedValue;
pub use date::{DatePrecision, IndivoDate};
pub use error::{ParseError, Result};
pub use numeric::Numeric;
pub use scalar::{ScalarKind, ScalarValue};
pub use unit::UnitValue;
