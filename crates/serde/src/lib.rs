//! # Indivo wire formats
//!
//! XML and JSON serialization for Indivo documents.
//!
//! Both formats go through the format-neutral
//! [`WireElement`](indivo_document::WireElement) tree, so the schema rules
//! (field order, required fields, coded values, references) are applied once
//! in `indivo-document` and the formats only differ in how the tree is
//! spelled.
//!
//! ## Features
//!
//! - **XML Support** (`xml` feature, default): quick-xml event reader and
//!   writer for the Indivo document vocabulary.
//! - **JSON Support**: a direct mapping of the element tree onto JSON objects
//!   through `serde_json`.
//!
//! ## XML ↔ JSON Mapping
//!
//! | XML | JSON |
//! |-----|------|
//! | `<Contact id="c1">` | `{"#type": "Contact", "@id": "c1"}` |
//! | `<dose>10 mg</dose>` | `"dose": "10 mg"` |
//! | `<name code="123">Aspirin</name>` | `"name": {"@code": "123", "#text": "Aspirin"}` |
//! | `<email>a</email><email>b</email>` | `"email": ["a", "b"]` |
//!
//! ## Examples
//!
//! ```
//! use indivo_serde::json::to_json_string;
//! use indivo_serde::xml::from_xml_str;
//! use indivo_records::Medication;
//!
//! let xml = r#"<Medication id="m1"><name code="123"/><dose>5 mg</dose></Medication>"#;
//! let medication: Medication = from_xml_str(xml)?;
//! assert_eq!(
//!     to_json_string(&medication)?,
//!     r##"{"#type":"Medication","@id":"m1","name":{"@code":"123"},"dose":"5 mg"}"##
//! );
//! # Ok::<(), indivo_serde::SerdeError>(())
//! ```

pub mod error;
pub mod json;

#[cfg(feature = "xml")]
pub mod xml;

// Re-export common types and functions
pub use error::{Result, SerdeError};

// Re-export JSON functions at top level for convenience
pub use json::{
    document_from_json_str, from_json_slice, from_json_str, from_json_value,
    record_from_json_str, to_json_string, to_json_string_pretty, to_json_value, to_json_vec,
};

#[cfg(feature = "xml")]
pub use xml::{
    document_from_xml_str, from_xml_reader, from_xml_slice, from_xml_str, read_wire_str,
    record_from_xml_str, to_xml_string, to_xml_string_pretty, to_xml_vec, to_xml_writer,
};
