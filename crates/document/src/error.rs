//! Error types for the binding core.
//!
//! Three families, matching when they can happen:
//!
//! | Error | Raised by | Meaning |
//! |-------|-----------|---------|
//! | [`SchemaError`] | schema and registry construction | programmer error, fatal at startup |
//! | [`BindingError`] | `Document::set`, `serialize`, `deserialize` | content does not fit the schema |
//! | [`RegistryError`] | `DocumentRegistry::create` | unknown type, or a binding failure |

use indivo_values::ParseError;
use thiserror::Error;

/// Misconfigured schemas or registries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("document type name cannot be empty")]
    EmptyTypeName,

    #[error("field {field:?} is declared more than once in {type_name}")]
    DuplicateField { type_name: String, field: String },

    #[error("document type {type_name} is already registered")]
    AlreadyRegistered { type_name: String },

    #[error("field {field:?} of {type_name} cannot be an attribute: {reason}")]
    InvalidAttributeBinding {
        type_name: String,
        field: String,
        reason: &'static str,
    },

    #[error("field name {field:?} in {type_name} is reserved for the document id")]
    ReservedName { type_name: String, field: String },

    #[error("field {field:?} of {type_name} references unknown document type {target}")]
    UnresolvedReference {
        type_name: String,
        field: String,
        target: String,
    },
}

/// Document content that does not match its schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("{type_name} has no field {field:?}")]
    UnknownField { type_name: String, field: String },

    #[error("field {field:?} of {type_name} expects {expected}, got {found}")]
    TypeMismatch {
        type_name: String,
        field: String,
        expected: String,
        found: String,
    },

    #[error(
        "field {field:?} of {type_name} is {}, value does not match",
        cardinality(.repeated)
    )]
    CardinalityMismatch {
        type_name: String,
        field: String,
        repeated: bool,
    },

    #[error("required field {field:?} of {type_name} is missing")]
    MissingRequired { type_name: String, field: String },

    #[error("field {field:?} of {type_name} has an invalid value: {source}")]
    InvalidValue {
        type_name: String,
        field: String,
        #[source]
        source: ParseError,
    },

    #[error("field {field:?} of {type_name} is single-valued but appears {count} times")]
    UnexpectedRepeat {
        type_name: String,
        field: String,
        count: usize,
    },

    #[error("expected element <{expected}>, found <{found}>")]
    UnexpectedElement { expected: String, found: String },

    #[error("expected a {expected} document, got {found}")]
    WrongDocumentType { expected: String, found: String },
}

fn cardinality(repeated: &bool) -> &'static str {
    if *repeated { "repeated" } else { "single-valued" }
}

/// Failures resolving or instantiating a document type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown document type {type_name:?}")]
    UnknownType { type_name: String },

    #[error(transparent)]
    Binding(#[from] BindingError),
}
