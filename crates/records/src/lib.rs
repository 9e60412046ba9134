//! # Indivo standard records
//!
//! The record types of the Indivo document vocabulary, declared as schemas
//! over `indivo-document` with typed accessor structs, plus the process-wide
//! [`registry()`] that resolves them by root element name.
//!
//! All types live in the [`INDIVO_NAMESPACE`] XML namespace. Ids are assigned
//! by the record server, so a locally created record has none.
//!
//! ```
//! use indivo_records::{registry, Medication};
//! use indivo_document::WireElement;
//!
//! let wire = WireElement::new("Medication")
//!     .with_child(WireElement::new("name").with_attribute("code", "123"));
//!
//! let record = registry().dispatch(&wire)?;
//! let medication = record.downcast_ref::<Medication>().unwrap();
//! assert_eq!(medication.name().unwrap().code(), "123");
//! # Ok::<(), indivo_document::RegistryError>(())
//! ```

pub mod contact;
pub mod medication;
pub mod prescription;

use once_cell::sync::Lazy;

use indivo_document::{DocumentRegistry, RegistryBuilder, SchemaError};

pub use contact::{CONTACT_LOCATION_SCHEMA, CONTACT_SCHEMA, Contact, ContactLocation};
pub use medication::{MEDICATION_SCHEMA, Medication};
pub use prescription::{PRESCRIPTION_SCHEMA, Prescription};

/// XML namespace of the Indivo document vocabulary.
pub const INDIVO_NAMESPACE: &str = "http://indivo.org/vocab/xml/documents#";

static REGISTRY: Lazy<DocumentRegistry> = Lazy::new(|| {
    registry_builder()
        .and_then(RegistryBuilder::build)
        .expect("built-in record types form a consistent registry")
});

/// The registry of the built-in record types, built on first use.
pub fn registry() -> &'static DocumentRegistry {
    &REGISTRY
}

/// A builder pre-loaded with the built-in record types, for applications
/// that register types of their own on top.
pub fn registry_builder() -> Result<RegistryBuilder, SchemaError> {
    DocumentRegistry::builder()
        .register_typed::<Medication>()?
        .register_typed::<Prescription>()?
        .register_typed::<Contact>()?
        .register_typed::<ContactLocation>()
}
