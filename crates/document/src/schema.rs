//! Field bindings and document schemas.
//!
//! A [`DocumentSchema`] is the ordered list of fields a document type may
//! hold. The order is the order fields are written on the wire, which the
//! upstream service relies on, so it is kept exactly as declared.
//!
//! ```
//! use indivo_document::{DocumentSchema, FieldBinding, ScalarKind};
//!
//! let schema = DocumentSchema::builder("Allergy")
//!     .namespace("http://indivo.org/vocab/xml/documents#")
//!     .field(FieldBinding::scalar("dateDiagnosed", ScalarKind::Date))
//!     .field(FieldBinding::scalar("allergen", ScalarKind::CodedValue).required())
//!     .build()?;
//!
//! assert!(schema.resolve("allergen").unwrap().is_required());
//! assert!(schema.resolve("severity").is_none());
//! # Ok::<(), indivo_document::SchemaError>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indivo_values::ScalarKind;

use crate::error::SchemaError;

/// Name of the identity attribute on every document element.
pub const ID_ATTRIBUTE: &str = "id";

/// What a field holds.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// A scalar of the given kind.
    Scalar(ScalarKind),
    /// A nested document owned by its parent.
    Document(Arc<DocumentSchema>),
    /// A weak link to another document, by type name and id.
    Reference(String),
}

impl FieldKind {
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            FieldKind::Scalar(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn nested_schema(&self) -> Option<&Arc<DocumentSchema>> {
        match self {
            FieldKind::Document(schema) => Some(schema),
            _ => None,
        }
    }
}

impl PartialEq for FieldKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldKind::Scalar(a), FieldKind::Scalar(b)) => a == b,
            (FieldKind::Document(a), FieldKind::Document(b)) => a.type_name() == b.type_name(),
            (FieldKind::Reference(a), FieldKind::Reference(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FieldKind {}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Scalar(kind) => fmt::Display::fmt(kind, f),
            FieldKind::Document(schema) => write!(f, "document {}", schema.type_name()),
            FieldKind::Reference(target) => write!(f, "reference to {}", target),
        }
    }
}

/// Where a field's value sits inside its parent element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireEncoding {
    /// A child element named after the field.
    #[default]
    Element,
    /// An attribute of the parent element.
    Attribute,
}

/// One declared field of a document type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    wire_name: String,
    kind: FieldKind,
    repeated: bool,
    required: bool,
    encoding: WireEncoding,
}

impl FieldBinding {
    pub fn new(wire_name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            wire_name: wire_name.into(),
            kind,
            repeated: false,
            required: false,
            encoding: WireEncoding::Element,
        }
    }

    pub fn scalar(wire_name: impl Into<String>, kind: ScalarKind) -> Self {
        Self::new(wire_name, FieldKind::Scalar(kind))
    }

    pub fn document(wire_name: impl Into<String>, schema: Arc<DocumentSchema>) -> Self {
        Self::new(wire_name, FieldKind::Document(schema))
    }

    pub fn reference(wire_name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self::new(wire_name, FieldKind::Reference(target_type.into()))
    }

    /// Marks the field as holding a sequence of values.
    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    /// Marks the field as mandatory for serialization.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Encodes the field as an attribute of the parent element.
    pub fn as_attribute(mut self) -> Self {
        self.encoding = WireEncoding::Attribute;
        self
    }

    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_repeated(&self) -> bool {
        self.repeated
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn encoding(&self) -> WireEncoding {
        self.encoding
    }

    fn attribute_problem(&self) -> Option<&'static str> {
        if self.encoding != WireEncoding::Attribute {
            return None;
        }
        if self.repeated {
            return Some("repeated fields need one element per value");
        }
        match &self.kind {
            FieldKind::Scalar(kind) if kind.is_textual() => None,
            FieldKind::Scalar(_) => Some("coded values have more than one part"),
            FieldKind::Document(_) => Some("nested documents need an element"),
            FieldKind::Reference(_) => Some("references need an element"),
        }
    }
}

/// Whether a document must carry an id to be serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdPolicy {
    #[default]
    Optional,
    Required,
}

/// The ordered, named, typed fields of one document type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSchema {
    type_name: String,
    type_uri: Option<String>,
    id_policy: IdPolicy,
    fields: Vec<FieldBinding>,
    index: HashMap<String, usize>,
}

impl DocumentSchema {
    /// Validates `fields` and builds the schema for `type_name`.
    pub fn define(
        type_name: impl Into<String>,
        fields: impl IntoIterator<Item = FieldBinding>,
    ) -> Result<Self, SchemaError> {
        let mut builder = Self::builder(type_name);
        for field in fields {
            builder = builder.field(field);
        }
        builder.build()
    }

    pub fn builder(type_name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            type_name: type_name.into(),
            type_uri: None,
            id_policy: IdPolicy::Optional,
            fields: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// XML namespace of the document element, if the type has one.
    pub fn type_uri(&self) -> Option<&str> {
        self.type_uri.as_deref()
    }

    pub fn id_policy(&self) -> IdPolicy {
        self.id_policy
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldBinding] {
        &self.fields
    }

    /// Looks up a field by its wire name.
    pub fn resolve(&self, wire_name: &str) -> Option<&FieldBinding> {
        self.index.get(wire_name).map(|&position| &self.fields[position])
    }

    /// Position of a field in wire order.
    pub fn position(&self, wire_name: &str) -> Option<usize> {
        self.index.get(wire_name).copied()
    }
}

/// Incremental construction of a [`DocumentSchema`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    type_name: String,
    type_uri: Option<String>,
    id_policy: IdPolicy,
    fields: Vec<FieldBinding>,
}

impl SchemaBuilder {
    pub fn namespace(mut self, type_uri: impl Into<String>) -> Self {
        self.type_uri = Some(type_uri.into());
        self
    }

    pub fn require_id(mut self) -> Self {
        self.id_policy = IdPolicy::Required;
        self
    }

    pub fn field(mut self, field: FieldBinding) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> Result<DocumentSchema, SchemaError> {
        if self.type_name.trim().is_empty() {
            return Err(SchemaError::EmptyTypeName);
        }

        let mut index = HashMap::with_capacity(self.fields.len());
        for (position, field) in self.fields.iter().enumerate() {
            if field.wire_name == ID_ATTRIBUTE {
                return Err(SchemaError::ReservedName {
                    type_name: self.type_name,
                    field: field.wire_name.clone(),
                });
            }
            if let Some(reason) = field.attribute_problem() {
                return Err(SchemaError::InvalidAttributeBinding {
                    type_name: self.type_name,
                    field: field.wire_name.clone(),
                    reason,
                });
            }
            if index.insert(field.wire_name.clone(), position).is_some() {
                return Err(SchemaError::DuplicateField {
                    type_name: self.type_name,
                    field: field.wire_name.clone(),
                });
            }
        }

        Ok(DocumentSchema {
            type_name: self.type_name,
            type_uri: self.type_uri,
            id_policy: self.id_policy,
            fields: self.fields,
            index,
        })
    }
}
