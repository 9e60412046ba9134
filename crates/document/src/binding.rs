//! Conversion between [`Document`]s and the [`WireElement`] tree.
//!
//! Serialization walks the schema in declaration order, so the element order
//! on the wire is always the schema order no matter how the document was
//! filled. Deserialization walks the schema too and only afterwards looks at
//! what was left over, which keeps unknown wire content from ever reaching a
//! document.
//!
//! | Field kind | Element encoding | Attribute encoding |
//! |------------|------------------|--------------------|
//! | text scalar | `<dose>10 mg</dose>` | `type="work"` |
//! | coded value | `<name code="123" codingSystem="rxnorm">Aspirin</name>` | not allowed |
//! | nested document | `<prescription>...</prescription>` | not allowed |
//! | reference | `<by id="contact-1"/>` | not allowed |

use std::sync::Arc;

use indivo_values::{CodedValue, ParseError, ScalarKind, ScalarValue};
use tracing::debug;

use crate::document::Document;
use crate::error::BindingError;
use crate::schema::{DocumentSchema, FieldBinding, FieldKind, ID_ATTRIBUTE, IdPolicy, WireEncoding};
use crate::value::{DocumentId, DocumentRef, FieldValue, Value};
use crate::wire::WireElement;

const CODE_ATTRIBUTE: &str = "code";
const CODING_SYSTEM_ATTRIBUTE: &str = "codingSystem";

/// What to do with wire content the schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownFieldPolicy {
    /// Skip it. Newer service versions may add fields older clients don't know.
    #[default]
    Ignore,
    /// Fail with [`BindingError::UnknownField`].
    Reject,
}

/// Knobs for [`Document::deserialize_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BindingOptions {
    pub unknown_fields: UnknownFieldPolicy,
}

impl BindingOptions {
    /// Options that reject unknown wire fields.
    pub fn strict() -> Self {
        Self {
            unknown_fields: UnknownFieldPolicy::Reject,
        }
    }
}

impl Document {
    /// Produces the wire tree of this document.
    ///
    /// The root element is named after the document type and carries the id
    /// as an attribute. Fails with [`BindingError::MissingRequired`] when a
    /// required field, or a required id, has no value; nested documents are
    /// checked the same way.
    pub fn serialize(&self) -> Result<WireElement, BindingError> {
        serialize_element(self, self.type_name())
    }

    /// Builds a document of `schema`'s type from a wire tree, ignoring
    /// undeclared content.
    pub fn deserialize(
        wire: &WireElement,
        schema: &Arc<DocumentSchema>,
    ) -> Result<Document, BindingError> {
        Self::deserialize_with(wire, schema, &BindingOptions::default())
    }

    pub fn deserialize_with(
        wire: &WireElement,
        schema: &Arc<DocumentSchema>,
        options: &BindingOptions,
    ) -> Result<Document, BindingError> {
        if wire.name != schema.type_name() {
            return Err(BindingError::UnexpectedElement {
                expected: schema.type_name().to_string(),
                found: wire.name.clone(),
            });
        }
        deserialize_element(wire, schema, options)
    }
}

fn serialize_element(document: &Document, element_name: &str) -> Result<WireElement, BindingError> {
    let schema = document.schema();
    let mut element = WireElement::new(element_name);

    match document.id() {
        Some(id) if id.as_str().is_empty() => {
            return Err(BindingError::InvalidValue {
                type_name: schema.type_name().to_string(),
                field: ID_ATTRIBUTE.to_string(),
                source: ParseError::Empty,
            });
        }
        Some(id) => element.push_attribute(ID_ATTRIBUTE, id.as_str()),
        None if schema.id_policy() == IdPolicy::Required => {
            return Err(missing(schema, ID_ATTRIBUTE));
        }
        None => {}
    }

    for binding in schema.fields() {
        let field = document.get(binding.wire_name());
        if field.is_absent() {
            if binding.is_required() {
                return Err(missing(schema, binding.wire_name()));
            }
            continue;
        }

        for value in field.values() {
            match binding.encoding() {
                WireEncoding::Attribute => {
                    if let Value::Scalar(scalar) = value {
                        element.push_attribute(binding.wire_name(), scalar.to_text());
                    }
                }
                WireEncoding::Element => {
                    element
                        .children
                        .push(serialize_value(binding.wire_name(), value)?);
                }
            }
        }
    }

    Ok(element)
}

fn serialize_value(wire_name: &str, value: &Value) -> Result<WireElement, BindingError> {
    Ok(match value {
        Value::Scalar(ScalarValue::CodedValue(coded)) => {
            let mut element = WireElement::new(wire_name).with_attribute(CODE_ATTRIBUTE, coded.code());
            if let Some(system) = coded.coding_system() {
                element.push_attribute(CODING_SYSTEM_ATTRIBUTE, system);
            }
            if let Some(display) = coded.display_text() {
                element.text = Some(display.to_string());
            }
            element
        }
        Value::Scalar(scalar) => WireElement::new(wire_name).with_text(scalar.to_text()),
        Value::Document(nested) => serialize_element(nested, wire_name)?,
        Value::Reference(reference) => {
            WireElement::new(wire_name).with_attribute(ID_ATTRIBUTE, reference.id().as_str())
        }
    })
}

fn deserialize_element(
    wire: &WireElement,
    schema: &Arc<DocumentSchema>,
    options: &BindingOptions,
) -> Result<Document, BindingError> {
    let mut document = Document::new(Arc::clone(schema));

    match wire.attribute(ID_ATTRIBUTE).filter(|id| !id.is_empty()) {
        Some(id) => document.set_id(Some(DocumentId::new(id))),
        None if schema.id_policy() == IdPolicy::Required => {
            return Err(missing(schema, ID_ATTRIBUTE));
        }
        None => {}
    }

    check_unknown(wire, schema, options)?;

    for binding in schema.fields() {
        let mut values: Vec<Value> = match binding.encoding() {
            WireEncoding::Attribute => read_attribute(wire, schema, binding)?.into_iter().collect(),
            WireEncoding::Element => read_elements(wire, schema, binding, options)?,
        };

        if values.is_empty() {
            if binding.is_required() {
                return Err(missing(schema, binding.wire_name()));
            }
            continue;
        }
        let value = if binding.is_repeated() {
            FieldValue::Repeated(values)
        } else {
            FieldValue::Single(values.swap_remove(0))
        };
        document.insert_unchecked(binding.wire_name(), value);
    }

    Ok(document)
}

fn check_unknown(
    wire: &WireElement,
    schema: &DocumentSchema,
    options: &BindingOptions,
) -> Result<(), BindingError> {
    let declared = |name: &str, encoding: WireEncoding| {
        schema
            .resolve(name)
            .is_some_and(|binding| binding.encoding() == encoding)
    };

    for (name, _) in &wire.attributes {
        if name == ID_ATTRIBUTE || is_namespace_declaration(name) {
            continue;
        }
        if !declared(name, WireEncoding::Attribute) {
            unknown_field(schema, name, "attribute", options)?;
        }
    }
    for child in &wire.children {
        if !declared(&child.name, WireEncoding::Element) {
            unknown_field(schema, &child.name, "element", options)?;
        }
    }
    Ok(())
}

fn unknown_field(
    schema: &DocumentSchema,
    name: &str,
    what: &str,
    options: &BindingOptions,
) -> Result<(), BindingError> {
    match options.unknown_fields {
        UnknownFieldPolicy::Ignore => {
            debug!(
                type_name = schema.type_name(),
                field = name,
                "ignoring unknown wire {}",
                what
            );
            Ok(())
        }
        UnknownFieldPolicy::Reject => Err(BindingError::UnknownField {
            type_name: schema.type_name().to_string(),
            field: name.to_string(),
        }),
    }
}

fn is_namespace_declaration(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:")
}

fn read_attribute(
    wire: &WireElement,
    schema: &DocumentSchema,
    binding: &FieldBinding,
) -> Result<Option<Value>, BindingError> {
    let Some(kind) = binding.kind().scalar_kind() else {
        return Ok(None);
    };
    match scalar_text(kind, wire.attribute(binding.wire_name())) {
        Some(text) => parse_scalar(schema, binding, kind, text).map(Some),
        None => Ok(None),
    }
}

fn read_elements(
    wire: &WireElement,
    schema: &DocumentSchema,
    binding: &FieldBinding,
    options: &BindingOptions,
) -> Result<Vec<Value>, BindingError> {
    let elements: Vec<&WireElement> = wire.children_named(binding.wire_name()).collect();
    if !binding.is_repeated() && elements.len() > 1 {
        return Err(BindingError::UnexpectedRepeat {
            type_name: schema.type_name().to_string(),
            field: binding.wire_name().to_string(),
            count: elements.len(),
        });
    }

    let mut values = Vec::with_capacity(elements.len());
    for element in elements {
        if let Some(value) = read_element(element, schema, binding, options)? {
            values.push(value);
        }
    }
    Ok(values)
}

/// The text of a scalar, or `None` when the value is absent.
///
/// Strings are kept verbatim, so only empty text is absent. Other kinds are
/// trimmed and blank text is absent.
fn scalar_text(kind: ScalarKind, text: Option<&str>) -> Option<&str> {
    match kind {
        ScalarKind::String => text.filter(|text| !text.is_empty()),
        _ => text.map(str::trim).filter(|text| !text.is_empty()),
    }
}

/// Decodes one field element. `None` means the element is purely empty and
/// the value is absent.
fn read_element(
    element: &WireElement,
    schema: &DocumentSchema,
    binding: &FieldBinding,
    options: &BindingOptions,
) -> Result<Option<Value>, BindingError> {
    if let FieldKind::Scalar(ScalarKind::String) = binding.kind() {
        return match scalar_text(ScalarKind::String, element.text.as_deref()) {
            Some(text) => parse_scalar(schema, binding, ScalarKind::String, text).map(Some),
            None => Ok(None),
        };
    }
    if element.is_empty() {
        return Ok(None);
    }

    match binding.kind() {
        FieldKind::Scalar(ScalarKind::CodedValue) => CodedValue::from_parts(
            element.attribute(CODE_ATTRIBUTE),
            element.attribute(CODING_SYSTEM_ATTRIBUTE),
            element.trimmed_text(),
        )
        .map(|coded| Some(Value::from(coded)))
        .map_err(|source| invalid(schema, binding, source)),
        FieldKind::Scalar(kind) => match scalar_text(*kind, element.text.as_deref()) {
            Some(text) => parse_scalar(schema, binding, *kind, text).map(Some),
            None => Ok(None),
        },
        // Only unknown content inside: nothing the schema can hold.
        FieldKind::Document(nested) => deserialize_element(element, nested, options)
            .map(|doc| Some(doc).filter(|doc| !doc.is_empty()).map(Value::Document)),
        FieldKind::Reference(target) => Ok(element
            .attribute(ID_ATTRIBUTE)
            .filter(|id| !id.is_empty())
            .map(|id| Value::Reference(DocumentRef::new(target.as_str(), id)))),
    }
}

fn parse_scalar(
    schema: &DocumentSchema,
    binding: &FieldBinding,
    kind: ScalarKind,
    text: &str,
) -> Result<Value, BindingError> {
    ScalarValue::parse_text(kind, text)
        .map(Value::Scalar)
        .map_err(|source| invalid(schema, binding, source))
}

fn invalid(schema: &DocumentSchema, binding: &FieldBinding, source: ParseError) -> BindingError {
    BindingError::InvalidValue {
        type_name: schema.type_name().to_string(),
        field: binding.wire_name().to_string(),
        source,
    }
}

fn missing(schema: &DocumentSchema, field: &str) -> BindingError {
    BindingError::MissingRequired {
        type_name: schema.type_name().to_string(),
        field: field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indivo_values::{IndivoDate, UnitValue};
    use rust_decimal_macros::dec;

    fn prescription() -> Arc<DocumentSchema> {
        Arc::new(
            DocumentSchema::define(
                "Prescription",
                [
                    FieldBinding::reference("by", "Contact"),
                    FieldBinding::scalar("instructions", ScalarKind::String),
                ],
            )
            .unwrap(),
        )
    }

    fn medication() -> Arc<DocumentSchema> {
        Arc::new(
            DocumentSchema::builder("Medication")
                .namespace("http://indivo.org/vocab/xml/documents#")
                .field(FieldBinding::scalar("dateStarted", ScalarKind::Date))
                .field(FieldBinding::scalar("name", ScalarKind::CodedValue).required())
                .field(FieldBinding::scalar("dose", ScalarKind::UnitValue))
                .field(FieldBinding::document("prescription", prescription()))
                .field(FieldBinding::scalar("details", ScalarKind::String).repeated())
                .build()
                .unwrap(),
        )
    }

    fn location() -> Arc<DocumentSchema> {
        Arc::new(
            DocumentSchema::builder("ContactLocation")
                .require_id()
                .field(FieldBinding::scalar("type", ScalarKind::String).as_attribute())
                .field(FieldBinding::scalar("latitude", ScalarKind::String))
                .build()
                .unwrap(),
        )
    }

    fn sample_wire() -> WireElement {
        WireElement::new("Medication")
            .with_attribute("id", "med-1")
            .with_attribute("xmlns", "http://indivo.org/vocab/xml/documents#")
            .with_child(WireElement::new("dateStarted").with_text("2020-01-01"))
            .with_child(
                WireElement::new("name")
                    .with_attribute("code", "123")
                    .with_attribute("codingSystem", "rxnorm")
                    .with_text("Aspirin"),
            )
            .with_child(WireElement::new("dose").with_text(" 10 mg "))
            .with_child(
                WireElement::new("prescription")
                    .with_child(WireElement::new("by").with_attribute("id", "contact-1"))
                    .with_child(WireElement::new("instructions").with_text("with food")),
            )
    }

    #[test]
    fn test_deserialize_reads_declared_fields() {
        let doc = Document::deserialize(&sample_wire(), &medication()).unwrap();
        assert_eq!(doc.id().map(DocumentId::as_str), Some("med-1"));
        assert_eq!(
            doc.get("dateStarted").scalar().and_then(ScalarValue::as_date),
            Some(&IndivoDate::from_ymd(2020, 1, 1).unwrap())
        );
        assert_eq!(
            doc.get("dose").scalar().and_then(ScalarValue::as_unit_value),
            Some(&UnitValue::new(dec!(10), "mg"))
        );
        let name = doc.get("name").scalar().and_then(ScalarValue::as_coded_value).unwrap();
        assert_eq!(name.code(), "123");
        assert_eq!(name.coding_system(), Some("rxnorm"));
        assert_eq!(name.display_text(), Some("Aspirin"));

        let prescription = doc.get("prescription").document().unwrap();
        assert_eq!(
            prescription.get("by").single().and_then(Value::as_reference),
            Some(&DocumentRef::new("Contact", "contact-1"))
        );
    }

    #[test]
    fn test_serialize_follows_schema_order() {
        let doc = Document::deserialize(&sample_wire(), &medication()).unwrap();
        let wire = doc.serialize().unwrap();
        let names: Vec<_> = wire.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["dateStarted", "name", "dose", "prescription"]);
        assert_eq!(wire.attribute("id"), Some("med-1"));
        assert_eq!(wire.children[2].text.as_deref(), Some("10 mg"));
        assert_eq!(wire.children[3].children[0].attribute("id"), Some("contact-1"));
    }

    #[test]
    fn test_round_trip() {
        let doc = Document::deserialize(&sample_wire(), &medication()).unwrap();
        let again = Document::deserialize(&doc.serialize().unwrap(), &medication()).unwrap();
        assert_eq!(doc, again);
    }

    #[test]
    fn test_built_documents_survive_the_wire() {
        let mut prescription = Document::new(prescription());
        prescription.set("instructions", "  with food\n").unwrap();
        prescription
            .set("by", DocumentRef::new("Contact", " c 1 "))
            .unwrap();

        let mut doc = Document::new(medication()).with_id(" med 1 ");
        doc.set(
            "name",
            CodedValue::new(" 123 ").with_system("rxnorm").with_display(" Aspirin "),
        )
        .unwrap();
        doc.set("dose", UnitValue::new(dec!(2.50), " ml ")).unwrap();
        doc.set("prescription", prescription).unwrap();
        doc.push("details", " ").unwrap();
        doc.push("details", "take\twith water ").unwrap();

        let again = Document::deserialize(&doc.serialize().unwrap(), &medication()).unwrap();
        assert_eq!(again, doc);
        assert_eq!(
            again.get("details").values()[1].to_string(),
            "take\twith water "
        );

        let schema = location();
        let mut work = Document::new(Arc::clone(&schema)).with_id("loc-1");
        work.set("type", " work ").unwrap();
        let again = Document::deserialize(&work.serialize().unwrap(), &schema).unwrap();
        assert_eq!(again, work);
    }

    #[test]
    fn test_empty_id_cannot_be_serialized() {
        let mut doc = Document::new(medication()).with_id("");
        doc.set("name", CodedValue::new("1")).unwrap();
        assert_eq!(
            doc.serialize().unwrap_err(),
            BindingError::InvalidValue {
                type_name: "Medication".to_string(),
                field: "id".to_string(),
                source: ParseError::Empty,
            }
        );
    }

    #[test]
    fn test_nested_document_with_only_unknown_content_is_absent() {
        let wire = WireElement::new("Medication")
            .with_child(WireElement::new("name").with_attribute("code", "1"))
            .with_child(WireElement::new("prescription").with_attribute("version", "2"));
        let doc = Document::deserialize(&wire, &medication()).unwrap();
        assert!(doc.get("prescription").is_absent());
    }

    #[test]
    fn test_unknown_fields_are_ignored_by_default() {
        let wire = sample_wire()
            .with_attribute("version", "2")
            .with_child(WireElement::new("color").with_text("blue"));
        let doc = Document::deserialize(&wire, &medication()).unwrap();
        assert!(doc.get("color").is_absent());
    }

    #[test]
    fn test_unknown_fields_rejected_when_strict() {
        let wire = sample_wire().with_child(WireElement::new("color").with_text("blue"));
        let err = Document::deserialize_with(&wire, &medication(), &BindingOptions::strict())
            .unwrap_err();
        assert_eq!(
            err,
            BindingError::UnknownField {
                type_name: "Medication".to_string(),
                field: "color".to_string(),
            }
        );
    }

    #[test]
    fn test_root_name_must_match() {
        let err = Document::deserialize(&WireElement::new("Allergy"), &medication()).unwrap_err();
        assert!(matches!(err, BindingError::UnexpectedElement { .. }));
    }

    #[test]
    fn test_required_field_missing_on_serialize() {
        let doc = Document::new(medication());
        assert_eq!(
            doc.serialize().unwrap_err(),
            BindingError::MissingRequired {
                type_name: "Medication".to_string(),
                field: "name".to_string(),
            }
        );
    }

    #[test]
    fn test_required_field_missing_on_deserialize() {
        let wire = WireElement::new("Medication")
            .with_child(WireElement::new("name"))
            .with_child(WireElement::new("dose").with_text("1 mg"));
        assert!(matches!(
            Document::deserialize(&wire, &medication()),
            Err(BindingError::MissingRequired { ref field, .. }) if field == "name"
        ));
    }

    #[test]
    fn test_empty_optional_element_is_absent() {
        let wire = WireElement::new("Medication")
            .with_child(WireElement::new("name").with_attribute("code", "1"))
            .with_child(WireElement::new("dateStarted").with_text("  "));
        let doc = Document::deserialize(&wire, &medication()).unwrap();
        assert!(doc.get("dateStarted").is_absent());
    }

    #[test]
    fn test_invalid_value_carries_parse_error() {
        let wire = WireElement::new("Medication")
            .with_child(WireElement::new("name").with_attribute("code", "1"))
            .with_child(WireElement::new("dose").with_text("abc mg"));
        assert_eq!(
            Document::deserialize(&wire, &medication()).unwrap_err(),
            BindingError::InvalidValue {
                type_name: "Medication".to_string(),
                field: "dose".to_string(),
                source: ParseError::InvalidNumber("abc".to_string()),
            }
        );
    }

    #[test]
    fn test_single_field_repeated_on_wire() {
        let wire = WireElement::new("Medication")
            .with_child(WireElement::new("name").with_attribute("code", "1"))
            .with_child(WireElement::new("dose").with_text("1 mg"))
            .with_child(WireElement::new("dose").with_text("2 mg"));
        assert!(matches!(
            Document::deserialize(&wire, &medication()),
            Err(BindingError::UnexpectedRepeat { count: 2, .. })
        ));
    }

    #[test]
    fn test_repeated_elements() {
        let wire = WireElement::new("Medication")
            .with_child(WireElement::new("name").with_attribute("code", "1"))
            .with_child(WireElement::new("details").with_text("a"))
            .with_child(WireElement::new("details").with_text("b"));
        let doc = Document::deserialize(&wire, &medication()).unwrap();
        assert_eq!(doc.get("details").values().len(), 2);

        let out = doc.serialize().unwrap();
        assert_eq!(out.children_named("details").count(), 2);
    }

    #[test]
    fn test_attribute_fields_and_required_id() {
        let wire = WireElement::new("ContactLocation")
            .with_attribute("id", "loc-1")
            .with_attribute("type", "work")
            .with_child(WireElement::new("latitude").with_text("42.36"));
        let doc = Document::deserialize(&wire, &location()).unwrap();
        assert_eq!(
            doc.get("type").scalar().and_then(ScalarValue::as_str),
            Some("work")
        );
        assert_eq!(doc.serialize().unwrap().attribute("type"), Some("work"));

        let mut anonymous = doc.clone();
        anonymous.set_id(None);
        assert_eq!(
            anonymous.serialize().unwrap_err(),
            BindingError::MissingRequired {
                type_name: "ContactLocation".to_string(),
                field: "id".to_string(),
            }
        );
    }
}
