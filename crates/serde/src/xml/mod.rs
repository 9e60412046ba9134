//! XML form of Indivo documents.
//!
//! ## Grammar
//!
//! ```xml
//! <Medication xmlns="http://indivo.org/vocab/xml/documents#" id="med-1">
//!   <dateStarted>2020-01-01</dateStarted>
//!   <name code="123" codingSystem="rxnorm">Aspirin</name>
//!   <dose>10 mg</dose>
//!   <prescription>
//!     <by id="contact-1"/>
//!     <instructions>with food</instructions>
//!   </prescription>
//! </Medication>
//! ```
//!
//! - The root element is the document type, in the type's namespace, with
//!   the document id as the `id` attribute.
//! - Text scalars are element text; coded values put `code` and
//!   `codingSystem` in attributes and the display text in the element.
//! - Nested documents are child elements named after the field.
//! - References are empty elements carrying the target id.
//! - Repeated fields are repeated sibling elements.
//!
//! Reading works on local names, so prefixed namespaces are fine. Comments,
//! processing instructions and the doctype are skipped; CDATA sections and
//! entity references become text.
//!
//! ## Examples
//!
//! ```
//! use indivo_serde::xml::{from_xml_str, to_xml_string};
//! use indivo_records::Medication;
//!
//! let xml = r#"<Medication xmlns="http://indivo.org/vocab/xml/documents#">
//!   <name code="123">Aspirin</name>
//!   <dose>10 mg</dose>
//! </Medication>"#;
//!
//! let medication: Medication = from_xml_str(xml)?;
//! assert_eq!(medication.name().unwrap().display_text(), Some("Aspirin"));
//! assert!(to_xml_string(&medication)?.contains("<dose>10 mg</dose>"));
//! # Ok::<(), indivo_serde::SerdeError>(())
//! ```

pub mod de;
pub mod ser;
mod utils;

// Re-export serialization functions
pub use ser::{to_xml_string, to_xml_string_pretty, to_xml_vec, to_xml_writer};

// Re-export deserialization functions
pub use de::{
    document_from_xml_str, from_xml_reader, from_xml_slice, from_xml_str, read_wire_reader,
    read_wire_str, record_from_xml_str,
};
