//! # Indivo document binding
//!
//! Schema-driven binding between Indivo clinical record documents and their
//! wire representation.
//!
//! A [`DocumentSchema`] lists the fields of one record type. A [`Document`]
//! stores values for those fields and checks every write against the schema.
//! [`Document::serialize`] and [`Document::deserialize`] convert to and from
//! the format-neutral [`WireElement`] tree, which the `indivo-serde` crate
//! maps onto XML and JSON text.
//!
//! ## Layers
//!
//! | Module | Role |
//! |--------|------|
//! | [`schema`] | field bindings and schema validation |
//! | [`document`], [`value`] | the generic field store |
//! | [`binding`] | document ↔ wire tree rules |
//! | [`registry`] | type name → schema and factory |
//! | [`typed`] | `typed_document!` accessor structs |
//! | [`asset`] | async contract for fetching referenced assets |
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use indivo_document::{Document, DocumentSchema, FieldBinding, ScalarKind, WireElement};
//!
//! let schema = Arc::new(DocumentSchema::define(
//!     "Medication",
//!     [
//!         FieldBinding::scalar("dateStarted", ScalarKind::Date),
//!         FieldBinding::scalar("dose", ScalarKind::UnitValue),
//!     ],
//! )?);
//!
//! let wire = WireElement::new("Medication")
//!     .with_child(WireElement::new("dateStarted").with_text("2020-01-01"))
//!     .with_child(WireElement::new("dose").with_text("10 mg"))
//!     .with_child(WireElement::new("pharmacy").with_text("ignored"));
//!
//! let medication = Document::deserialize(&wire, &schema)?;
//! assert!(medication.get("pharmacy").is_absent());
//! assert_eq!(medication.serialize()?.children.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod asset;
pub mod binding;
pub mod document;
pub mod error;
pub mod registry;
pub mod schema;
pub mod typed;
pub mod value;
pub mod wire;

pub use asset::{Asset, AssetError, AssetFetcher, AssetRef};
pub use binding::{BindingOptions, UnknownFieldPolicy};
pub use document::Document;
pub use error::{BindingError, RegistryError, SchemaError};
pub use registry::{DocumentRegistry, Factory, Record, RegistryBuilder, TypedDocument};
pub use schema::{
    DocumentSchema, FieldBinding, FieldKind, ID_ATTRIBUTE, IdPolicy, SchemaBuilder, WireEncoding,
};
pub use value::{DocumentId, DocumentRef, Field, FieldType, FieldValue, Value};
pub use wire::WireElement;

pub use indivo_values::{
    CodedValue, DatePrecision, IndivoDate, Numeric, ParseError, ScalarKind, ScalarValue, UnitValue,
};
