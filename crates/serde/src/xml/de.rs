//! Reading Indivo XML into the element tree.
//!
//! The reader builds a [`WireElement`] tree from quick-xml events with an
//! explicit stack of open elements. Text is accumulated per element across
//! text, CDATA and entity-reference events. Leaf text is kept as written;
//! whitespace between child elements is dropped. Reading stops at the end of
//! the root element. Input that is not valid UTF-8 is an error.

use std::io::BufRead;
use std::sync::Arc;

use indivo_document::{Document, DocumentRegistry, DocumentSchema, Record, TypedDocument, WireElement};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::trace;

use crate::error::{Result, SerdeError};
use crate::xml::utils;

/// Deserialize a typed record from an XML string.
///
/// # Examples
///
/// ```
/// use indivo_serde::xml::from_xml_str;
/// use indivo_records::Contact;
///
/// let xml = r#"<Contact id="c1"><fullName>Gregory House</fullName></Contact>"#;
/// let contact: Contact = from_xml_str(xml)?;
/// assert_eq!(contact.full_name().as_deref(), Some("Gregory House"));
/// # Ok::<(), indivo_serde::SerdeError>(())
/// ```
pub fn from_xml_str<T: TypedDocument>(xml: &str) -> Result<T> {
    typed_from_wire(read_wire_str(xml)?)
}

/// Deserialize a typed record from XML bytes.
pub fn from_xml_slice<T: TypedDocument>(xml: &[u8]) -> Result<T> {
    from_xml_str(utils::decode_utf8(xml)?)
}

/// Deserialize a typed record from an XML reader.
pub fn from_xml_reader<R: BufRead, T: TypedDocument>(reader: R) -> Result<T> {
    typed_from_wire(read_wire_reader(reader)?)
}

/// Deserialize a generic document of `schema`'s type from an XML string.
pub fn document_from_xml_str(xml: &str, schema: &Arc<DocumentSchema>) -> Result<Document> {
    let wire = read_wire_str(xml)?;
    Ok(Document::deserialize(&wire, schema)?)
}

/// Deserialize whatever registered type the root element names.
pub fn record_from_xml_str(xml: &str, registry: &DocumentRegistry) -> Result<Box<dyn Record>> {
    let wire = read_wire_str(xml)?;
    Ok(registry.dispatch(&wire)?)
}

/// Parse XML text into the element tree without binding it to a schema.
pub fn read_wire_str(xml: &str) -> Result<WireElement> {
    read_wire(Reader::from_str(xml))
}

/// Parse XML from a buffered reader into the element tree.
pub fn read_wire_reader<R: BufRead>(reader: R) -> Result<WireElement> {
    read_wire(Reader::from_reader(reader))
}

fn typed_from_wire<T: TypedDocument>(wire: WireElement) -> Result<T> {
    let document = Document::deserialize(&wire, T::schema())?;
    Ok(T::from_document(document)?)
}

/// An element whose end tag has not been seen yet.
struct OpenElement {
    element: WireElement,
    text: String,
}

impl OpenElement {
    fn close(mut self) -> WireElement {
        let has_children = !self.element.children.is_empty();
        self.element.text = utils::element_text(self.text, has_children);
        self.element
    }
}

fn read_wire<R: BufRead>(mut reader: Reader<R>) -> Result<WireElement> {
    let mut buf = Vec::new();
    let mut stack: Vec<OpenElement> = Vec::new();

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => {
                stack.push(OpenElement {
                    element: element_from_start(&start)?,
                    text: String::new(),
                });
            }
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                if let Some(root) = attach(&mut stack, element) {
                    return Ok(root);
                }
            }
            Event::End(_) => {
                let open = stack
                    .pop()
                    .ok_or_else(|| SerdeError::Custom("unbalanced end tag".to_string()))?;
                if let Some(root) = attach(&mut stack, open.close()) {
                    return Ok(root);
                }
            }
            Event::Text(text) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&utils::unescape_bytes(&text)?);
                }
            }
            Event::CData(data) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(utils::decode_utf8(&data)?);
                }
            }
            Event::GeneralRef(reference) => {
                if let Some(open) = stack.last_mut() {
                    let name = utils::decode_utf8(&reference)?;
                    open.text.push_str(&utils::resolve_entity(name)?);
                }
            }
            Event::Eof => {
                return Err(SerdeError::Custom(match stack.last() {
                    Some(open) => format!(
                        "unexpected end of input inside <{}>",
                        open.element.name
                    ),
                    None => "XML input has no root element".to_string(),
                }));
            }
            Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {}
        }
    }
}

/// Adds a closed element to its parent. Returns the element itself when it
/// is the root.
fn attach(stack: &mut [OpenElement], element: WireElement) -> Option<WireElement> {
    match stack.last_mut() {
        Some(parent) => {
            parent.element.children.push(element);
            None
        }
        None => {
            trace!(
                element = %element.name,
                children = element.children.len(),
                "read XML root element"
            );
            Some(element)
        }
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<WireElement> {
    let name = utils::decode_utf8(start.local_name().as_ref())?.to_string();
    let mut element = WireElement::new(name);

    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if utils::is_namespace_declaration(attr.key.as_ref()) {
            continue;
        }
        let key = utils::decode_utf8(attr.key.local_name().as_ref())?.to_string();
        let value = utils::unescape_bytes(&attr.value)?;
        element.push_attribute(key, value);
    }

    Ok(element)
}
