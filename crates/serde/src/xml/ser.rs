//! Writing documents as Indivo XML.
//!
//! The document is first turned into its [`WireElement`] tree, which applies
//! the schema rules, and the tree is then streamed to quick-xml as events.

use std::io::Write;

use indivo_document::{Document, WireElement};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::trace;

use crate::error::{Result, SerdeError};

/// Serialize a document to an XML string.
///
/// # Examples
///
/// ```
/// use indivo_serde::xml::to_xml_string;
/// use indivo_records::Contact;
///
/// let mut contact = Contact::new();
/// contact.set_full_name(Some("Gregory House".to_string()))?;
/// assert_eq!(
///     to_xml_string(&contact)?,
///     r#"<?xml version="1.0" encoding="UTF-8"?><Contact xmlns="http://indivo.org/vocab/xml/documents#"><fullName>Gregory House</fullName></Contact>"#
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn to_xml_string(document: &Document) -> Result<String> {
    let buffer = to_xml_vec(document)?;
    String::from_utf8(buffer).map_err(|e| SerdeError::Custom(e.to_string()))
}

/// Serialize a document to an indented XML string.
pub fn to_xml_string_pretty(document: &Document) -> Result<String> {
    let mut buffer = Vec::new();
    let mut serializer = XmlSerializer::new(Writer::new_with_indent(&mut buffer, b' ', 2));
    serializer.write_document(document)?;
    String::from_utf8(buffer).map_err(|e| SerdeError::Custom(e.to_string()))
}

/// Serialize a document to an XML byte vector.
pub fn to_xml_vec(document: &Document) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    to_xml_writer(document, &mut buffer)?;
    Ok(buffer)
}

/// Serialize a document to an XML writer.
pub fn to_xml_writer<W: Write>(document: &Document, writer: W) -> Result<()> {
    let mut serializer = XmlSerializer::new(Writer::new(writer));
    serializer.write_document(document)
}

struct XmlSerializer<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> XmlSerializer<W> {
    fn new(writer: Writer<W>) -> Self {
        Self { writer }
    }

    fn write_document(&mut self, document: &Document) -> Result<()> {
        let mut root = document.serialize()?;
        if let Some(namespace) = document.schema().type_uri() {
            root.attributes
                .insert(0, ("xmlns".to_string(), namespace.to_string()));
        }
        trace!(
            type_name = document.type_name(),
            fields = root.children.len(),
            "writing XML document"
        );

        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.write_element(&root)?;
        self.writer.get_mut().flush()?;
        Ok(())
    }

    fn write_element(&mut self, element: &WireElement) -> Result<()> {
        let mut start = BytesStart::new(element.name.as_str());
        for (key, value) in &element.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if element.text.is_none() && element.children.is_empty() {
            self.writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        self.writer.write_event(Event::Start(start))?;
        if let Some(text) = &element.text {
            self.writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &element.children {
            self.write_element(child)?;
        }
        self.writer
            .write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::de::read_wire_str;
    use indivo_document::{DocumentSchema, FieldBinding, ScalarKind};
    use std::sync::Arc;

    fn note_schema() -> Arc<DocumentSchema> {
        Arc::new(
            DocumentSchema::builder("Note")
                .field(FieldBinding::scalar("kind", ScalarKind::String).as_attribute())
                .field(FieldBinding::scalar("text", ScalarKind::String))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_escapes_text_and_attributes() {
        let mut note = Document::new(note_schema()).with_id("n&1");
        note.set("kind", "a<b").unwrap();
        note.set("text", "Tom & \"Jerry\"").unwrap();

        let xml = to_xml_string(&note).unwrap();
        assert!(xml.contains(r#"id="n&amp;1""#));
        assert!(xml.contains(r#"kind="a&lt;b""#));
        assert!(xml.contains("Tom &amp;"));

        let wire = read_wire_str(&xml).unwrap();
        assert_eq!(wire.attribute("id"), Some("n&1"));
        assert_eq!(wire.children[0].text.as_deref(), Some("Tom & \"Jerry\""));
    }

    #[test]
    fn test_no_namespace_without_type_uri() {
        let note = Document::new(note_schema());
        assert_eq!(
            to_xml_string(&note).unwrap(),
            r#"<?xml version="1.0" encoding="UTF-8"?><Note/>"#
        );
    }

    #[test]
    fn test_pretty_output_is_indented() {
        let mut note = Document::new(note_schema());
        note.set("text", "hello").unwrap();
        let xml = to_xml_string_pretty(&note).unwrap();
        assert!(xml.contains("\n  <text>hello</text>\n"));
        assert_eq!(read_wire_str(&xml).unwrap().children.len(), 1);
    }

    #[test]
    fn test_missing_required_field_is_binding_error() {
        let schema = Arc::new(
            DocumentSchema::define(
                "Note",
                [FieldBinding::scalar("text", ScalarKind::String).required()],
            )
            .unwrap(),
        );
        let err = to_xml_string(&Document::new(schema)).unwrap_err();
        assert!(matches!(err, SerdeError::Binding(_)));
    }
}
