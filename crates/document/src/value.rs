//! Field values held by a [`Document`].

use std::fmt;

use indivo_values::{CodedValue, IndivoDate, Numeric, ScalarValue, UnitValue};

use crate::document::Document;
use crate::schema::FieldKind;

/// Opaque document identifier assigned by the record service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A weak link to another document. Resolving it is up to whoever holds the
/// record collection; the referring document does not own the target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    type_name: String,
    id: DocumentId,
}

impl DocumentRef {
    pub fn new(type_name: impl Into<String>, id: impl Into<DocumentId>) -> Self {
        Self {
            type_name: type_name.into(),
            id: id.into(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.type_name, self.id)
    }
}

/// One value of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(ScalarValue),
    Document(Document),
    Reference(DocumentRef),
}

impl Value {
    /// Whether the value may be stored in a field of `kind`.
    pub fn matches(&self, kind: &FieldKind) -> bool {
        match (self, kind) {
            (Value::Scalar(scalar), FieldKind::Scalar(expected)) => scalar.kind() == *expected,
            (Value::Document(document), FieldKind::Document(schema)) => {
                document.type_name() == schema.type_name()
            }
            (Value::Reference(reference), FieldKind::Reference(target)) => {
                reference.type_name() == target
            }
            _ => false,
        }
    }

    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Value::Scalar(scalar) => scalar.kind().to_string(),
            Value::Document(document) => format!("document {}", document.type_name()),
            Value::Reference(reference) => format!("reference to {}", reference.type_name()),
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            Value::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(document) => Some(document),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&DocumentRef> {
        match self {
            Value::Reference(reference) => Some(reference),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(scalar) => fmt::Display::fmt(scalar, f),
            Value::Document(document) => match document.id() {
                Some(id) => write!(f, "<{} {}>", document.type_name(), id),
                None => write!(f, "<{}>", document.type_name()),
            },
            Value::Reference(reference) => write!(f, "-> {}", reference),
        }
    }
}

/// The stored content of a field: one value or a sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Single(Value),
    Repeated(Vec<Value>),
}

impl FieldValue {
    pub fn values(&self) -> &[Value] {
        match self {
            FieldValue::Single(value) => std::slice::from_ref(value),
            FieldValue::Repeated(values) => values,
        }
    }
}

/// Result of [`Document::get`]. Missing fields are [`Field::Absent`], never an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    Absent,
    Single(&'a Value),
    Repeated(&'a [Value]),
}

impl<'a> Field<'a> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    /// The value of a single-valued field.
    pub fn single(self) -> Option<&'a Value> {
        match self {
            Field::Single(value) => Some(value),
            _ => None,
        }
    }

    /// All values: empty when absent, one element for a single value.
    pub fn values(self) -> &'a [Value] {
        match self {
            Field::Absent => &[],
            Field::Single(value) => std::slice::from_ref(value),
            Field::Repeated(values) => values,
        }
    }

    pub fn scalar(self) -> Option<&'a ScalarValue> {
        self.single().and_then(Value::as_scalar)
    }

    pub fn document(self) -> Option<&'a Document> {
        self.single().and_then(Value::as_document)
    }
}

impl<'a> From<Option<&'a FieldValue>> for Field<'a> {
    fn from(stored: Option<&'a FieldValue>) -> Self {
        match stored {
            None => Field::Absent,
            Some(FieldValue::Single(value)) => Field::Single(value),
            Some(FieldValue::Repeated(values)) => Field::Repeated(values),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Single(value)
    }
}

impl From<Vec<Value>> for FieldValue {
    fn from(values: Vec<Value>) -> Self {
        FieldValue::Repeated(values)
    }
}

macro_rules! impl_value_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    Value::$variant(value.into())
                }
            }

            impl From<$source> for FieldValue {
                fn from(value: $source) -> Self {
                    FieldValue::Single(Value::from(value))
                }
            }
        )*
    };
}

impl_value_from! {
    ScalarValue => Scalar,
    IndivoDate => Scalar,
    String => Scalar,
    &str => Scalar,
    CodedValue => Scalar,
    UnitValue => Scalar,
    Numeric => Scalar,
    Document => Document,
    DocumentRef => Reference,
}

/// Conversion between a typed accessor's Rust type and a stored [`Value`].
///
/// Typed accessors return owned values; scalars are small and nested
/// documents are cloned out of their parent.
pub trait FieldType: Sized {
    fn from_value(value: &Value) -> Option<Self>;
    fn into_value(self) -> Value;
}

macro_rules! impl_scalar_field_type {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FieldType for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Scalar(ScalarValue::$variant(inner)) => Some(inner.clone()),
                        _ => None,
                    }
                }

                fn into_value(self) -> Value {
                    Value::Scalar(ScalarValue::$variant(self))
                }
            }
        )*
    };
}

impl_scalar_field_type! {
    IndivoDate => Date,
    String => String,
    CodedValue => CodedValue,
    UnitValue => UnitValue,
    Numeric => Numeric,
}

impl FieldType for DocumentRef {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_reference().cloned()
    }

    fn into_value(self) -> Value {
        Value::Reference(self)
    }
}

impl FieldType for Document {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_document().cloned()
    }

    fn into_value(self) -> Value {
        Value::Document(self)
    }
}
