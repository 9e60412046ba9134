//! JSON form of Indivo documents.
//!
//! The JSON mapping mirrors the XML element tree one to one:
//!
//! | XML | JSON |
//! |-----|------|
//! | `<Medication id="m1">` (root) | `{"#type": "Medication", "@id": "m1", ...}` |
//! | `<dose>10 mg</dose>` | `"dose": "10 mg"` |
//! | `<name code="123">Aspirin</name>` | `"name": {"@code": "123", "#text": "Aspirin"}` |
//! | `<email>a</email><email>b</email>` | `"email": ["a", "b"]` |
//!
//! An element with only text becomes a string. Anything else becomes an
//! object with `@`-prefixed attributes, `#text` for character content, and
//! one key per child name. A single occurrence of a repeated field is written
//! bare and readers accept it either way.
//!
//! ```
//! use indivo_serde::json::{from_json_str, to_json_string};
//! use indivo_records::Medication;
//!
//! let json = r##"{"#type": "Medication", "name": {"@code": "123"}, "dose": "10 mg"}"##;
//! let medication: Medication = from_json_str(json)?;
//! assert_eq!(medication.dose().unwrap().unit(), "mg");
//! assert_eq!(
//!     to_json_string(&medication)?,
//!     r##"{"#type":"Medication","name":{"@code":"123"},"dose":"10 mg"}"##
//! );
//! # Ok::<(), indivo_serde::SerdeError>(())
//! ```

use std::sync::Arc;

use indivo_document::{Document, DocumentRegistry, DocumentSchema, Record, TypedDocument, WireElement};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Value as JsonValue};

use crate::error::{Result, SerdeError};

/// Key holding the document type on the root object.
pub const TYPE_KEY: &str = "#type";
/// Key holding character content of an element with attributes or children.
pub const TEXT_KEY: &str = "#text";
/// Prefix marking attribute keys.
pub const ATTRIBUTE_PREFIX: char = '@';

/// Serialize a document to a `serde_json::Value`.
pub fn to_json_value(document: &Document) -> Result<JsonValue> {
    let wire = document.serialize()?;
    Ok(serde_json::to_value(JsonElement::root(&wire))?)
}

/// Serialize a document to a compact JSON string.
pub fn to_json_string(document: &Document) -> Result<String> {
    let wire = document.serialize()?;
    Ok(serde_json::to_string(&JsonElement::root(&wire))?)
}

/// Serialize a document to a pretty-printed JSON string.
pub fn to_json_string_pretty(document: &Document) -> Result<String> {
    let wire = document.serialize()?;
    Ok(serde_json::to_string_pretty(&JsonElement::root(&wire))?)
}

/// Serialize a document to a JSON byte vector.
pub fn to_json_vec(document: &Document) -> Result<Vec<u8>> {
    let wire = document.serialize()?;
    Ok(serde_json::to_vec(&JsonElement::root(&wire))?)
}

/// Deserialize a typed record from a JSON string.
pub fn from_json_str<T: TypedDocument>(json: &str) -> Result<T> {
    from_json_value(serde_json::from_str(json)?)
}

/// Deserialize a typed record from JSON bytes.
pub fn from_json_slice<T: TypedDocument>(json: &[u8]) -> Result<T> {
    from_json_value(serde_json::from_slice(json)?)
}

/// Deserialize a typed record from a `serde_json::Value`.
pub fn from_json_value<T: TypedDocument>(value: JsonValue) -> Result<T> {
    let wire = wire_from_json_value(&value)?;
    let document = Document::deserialize(&wire, T::schema())?;
    Ok(T::from_document(document)?)
}

/// Deserialize a generic document of `schema`'s type from a JSON string.
pub fn document_from_json_str(json: &str, schema: &Arc<DocumentSchema>) -> Result<Document> {
    let wire = read_wire_json(json)?;
    Ok(Document::deserialize(&wire, schema)?)
}

/// Deserialize whatever registered type the `#type` key names.
pub fn record_from_json_str(json: &str, registry: &DocumentRegistry) -> Result<Box<dyn Record>> {
    let wire = read_wire_json(json)?;
    Ok(registry.dispatch(&wire)?)
}

/// Parse JSON text into the element tree without binding it to a schema.
pub fn read_wire_json(json: &str) -> Result<WireElement> {
    wire_from_json_value(&serde_json::from_str(json)?)
}

/// Convert a root JSON object into the element tree.
pub fn wire_from_json_value(value: &JsonValue) -> Result<WireElement> {
    let object = value
        .as_object()
        .ok_or_else(|| SerdeError::Custom("document JSON must be an object".to_string()))?;
    let type_name = object
        .get(TYPE_KEY)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| SerdeError::Custom(format!("document JSON has no {TYPE_KEY:?} key")))?;
    element_from_object(type_name, object, true)
}

fn element_from_json(name: &str, value: &JsonValue) -> Result<WireElement> {
    match value {
        JsonValue::Object(object) => element_from_object(name, object, false),
        JsonValue::Null => Ok(WireElement::new(name)),
        other => Ok(WireElement::new(name).with_text(scalar_text(name, other)?)),
    }
}

fn element_from_object(name: &str, object: &Map<String, JsonValue>, root: bool) -> Result<WireElement> {
    let mut element = WireElement::new(name);
    for (key, value) in object {
        if root && key == TYPE_KEY {
            continue;
        }
        if key == TEXT_KEY {
            element.text = Some(scalar_text(name, value)?);
        } else if let Some(attribute) = key.strip_prefix(ATTRIBUTE_PREFIX) {
            element.push_attribute(attribute, scalar_text(key, value)?);
        } else if let JsonValue::Array(items) = value {
            for item in items {
                element.children.push(element_from_json(key, item)?);
            }
        } else {
            element.children.push(element_from_json(key, value)?);
        }
    }
    Ok(element)
}

/// Numbers and booleans are accepted where the XML form has text.
fn scalar_text(key: &str, value: &JsonValue) -> Result<String> {
    match value {
        JsonValue::String(text) => Ok(text.clone()),
        JsonValue::Number(number) => Ok(number.to_string()),
        JsonValue::Bool(flag) => Ok(flag.to_string()),
        _ => Err(SerdeError::Custom(format!(
            "expected text for {key:?}, found {value}"
        ))),
    }
}

/// Serializable view of an element in the JSON mapping.
struct JsonElement<'a> {
    element: &'a WireElement,
    root: bool,
}

impl<'a> JsonElement<'a> {
    fn root(element: &'a WireElement) -> Self {
        Self {
            element,
            root: true,
        }
    }

    fn child(element: &'a WireElement) -> Self {
        Self {
            element,
            root: false,
        }
    }

    /// Children grouped by name, in order of first appearance.
    fn groups(&self) -> Vec<(&'a str, Vec<&'a WireElement>)> {
        let mut groups: Vec<(&'a str, Vec<&'a WireElement>)> = Vec::new();
        for child in &self.element.children {
            match groups.iter_mut().find(|(name, _)| *name == child.name) {
                Some((_, members)) => members.push(child),
                None => groups.push((&child.name, vec![child])),
            }
        }
        groups
    }
}

impl Serialize for JsonElement<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let element = self.element;
        if !self.root && element.attributes.is_empty() && element.children.is_empty() {
            return serializer.serialize_str(element.text.as_deref().unwrap_or_default());
        }

        let mut map = serializer.serialize_map(None)?;
        if self.root {
            map.serialize_entry(TYPE_KEY, &element.name)?;
        }
        for (name, value) in &element.attributes {
            map.serialize_entry(&format!("{ATTRIBUTE_PREFIX}{name}"), value)?;
        }
        if let Some(text) = &element.text {
            map.serialize_entry(TEXT_KEY, text)?;
        }
        for (name, members) in self.groups() {
            match members.as_slice() {
                [single] => map.serialize_entry(name, &JsonElement::child(single))?,
                many => map.serialize_entry(name, &JsonGroup(many))?,
            }
        }
        map.end()
    }
}

struct JsonGroup<'a>(&'a [&'a WireElement]);

impl Serialize for JsonGroup<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for element in self.0 {
            seq.serialize_element(&JsonElement::child(element))?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_element_mapping() {
        let wire = WireElement::new("Contact")
            .with_attribute("id", "c1")
            .with_child(WireElement::new("fullName").with_text("A B"))
            .with_child(WireElement::new("email").with_text("a@x.org"))
            .with_child(WireElement::new("email").with_text("b@x.org"))
            .with_child(
                WireElement::new("location")
                    .with_attribute("type", "work")
                    .with_child(WireElement::new("contact").with_attribute("id", "c1")),
            );

        let value = serde_json::to_value(JsonElement::root(&wire)).unwrap();
        assert_eq!(
            value,
            json!({
                "#type": "Contact",
                "@id": "c1",
                "fullName": "A B",
                "email": ["a@x.org", "b@x.org"],
                "location": {"@type": "work", "contact": {"@id": "c1"}}
            })
        );
        assert_eq!(wire_from_json_value(&value).unwrap(), wire);
    }

    #[test]
    fn test_bare_single_and_scalar_coercion() {
        let value = json!({"#type": "Contact", "email": "a@x.org", "phoneNumber": 5551234});
        let wire = wire_from_json_value(&value).unwrap();
        assert_eq!(wire.children_named("email").count(), 1);
        assert_eq!(
            wire.children_named("phoneNumber").next().unwrap().text.as_deref(),
            Some("5551234")
        );
    }

    #[test]
    fn test_missing_type_key() {
        let err = wire_from_json_value(&json!({"fullName": "A"})).unwrap_err();
        assert!(err.to_string().contains("#type"));
        assert!(wire_from_json_value(&json!(["Contact"])).is_err());
    }

    #[test]
    fn test_nested_objects_are_rejected_as_text() {
        let err = wire_from_json_value(&json!({"#type": "Contact", "@id": {"x": 1}})).unwrap_err();
        assert!(matches!(err, SerdeError::Custom(_)));
    }
}
