//! The generic, schema-driven document store.

use std::collections::HashMap;
use std::sync::Arc;

use indivo_values::ParseError;

use crate::error::BindingError;
use crate::schema::{DocumentSchema, FieldBinding};
use crate::value::{DocumentId, Field, FieldValue, Value};

/// A runtime instance of a schema-typed clinical record.
///
/// Values are keyed by wire name and checked against the schema on every
/// write, so a document never holds a value its schema does not allow.
/// Nested documents are owned; references to other documents are
/// [`DocumentRef`](crate::DocumentRef)s.
///
/// ```
/// use std::sync::Arc;
/// use indivo_document::{Document, DocumentSchema, FieldBinding, ScalarKind};
/// use indivo_values::UnitValue;
///
/// let schema = Arc::new(DocumentSchema::define(
///     "Medication",
///     [FieldBinding::scalar("dose", ScalarKind::UnitValue)],
/// )?);
///
/// let mut medication = Document::new(schema);
/// assert!(medication.get("dose").is_absent());
///
/// medication.set("dose", "10 mg".parse::<UnitValue>()?)?;
/// assert_eq!(medication.get("dose").scalar().unwrap().to_text(), "10 mg");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    schema: Arc<DocumentSchema>,
    id: Option<DocumentId>,
    values: HashMap<String, FieldValue>,
}

impl Document {
    /// Creates an empty document of the schema's type.
    pub fn new(schema: Arc<DocumentSchema>) -> Self {
        Self {
            schema,
            id: None,
            values: HashMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<DocumentId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn schema(&self) -> &Arc<DocumentSchema> {
        &self.schema
    }

    pub fn type_name(&self) -> &str {
        self.schema.type_name()
    }

    pub fn id(&self) -> Option<&DocumentId> {
        self.id.as_ref()
    }

    pub fn set_id(&mut self, id: Option<DocumentId>) {
        self.id = id;
    }

    /// Returns the value of `field`, or [`Field::Absent`] when it has none or
    /// the schema does not declare it.
    pub fn get(&self, field: &str) -> Field<'_> {
        Field::from(self.values.get(field))
    }

    /// Stores `value` in `field` after checking it against the field binding.
    ///
    /// Single-valued fields take a [`FieldValue::Single`], repeated fields a
    /// [`FieldValue::Repeated`]. An empty sequence clears the field.
    ///
    /// Values with no wire form are [`BindingError::InvalidValue`]: an empty
    /// string, a blank code, a unit value without a unit, an empty nested
    /// document and a reference with an empty id.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<(), BindingError> {
        let value = value.into();
        let binding = self.binding(field)?;

        match &value {
            FieldValue::Single(single) => {
                if binding.is_repeated() {
                    return Err(self.cardinality_mismatch(binding));
                }
                self.check_kind(binding, single)?;
            }
            FieldValue::Repeated(values) => {
                if !binding.is_repeated() {
                    return Err(self.cardinality_mismatch(binding));
                }
                for single in values {
                    self.check_kind(binding, single)?;
                }
                if values.is_empty() {
                    self.values.remove(field);
                    return Ok(());
                }
            }
        }

        self.values.insert(field.to_string(), value);
        Ok(())
    }

    /// Appends one value to a repeated field.
    pub fn push(&mut self, field: &str, value: impl Into<Value>) -> Result<(), BindingError> {
        let value = value.into();
        let binding = self.binding(field)?;
        if !binding.is_repeated() {
            return Err(self.cardinality_mismatch(binding));
        }
        self.check_kind(binding, &value)?;

        let mut values = match self.values.remove(field) {
            None => Vec::new(),
            Some(FieldValue::Repeated(values)) => values,
            Some(FieldValue::Single(previous)) => vec![previous],
        };
        values.push(value);
        self.values
            .insert(field.to_string(), FieldValue::Repeated(values));
        Ok(())
    }

    /// Removes the value of `field`, returning what was stored.
    pub fn clear(&mut self, field: &str) -> Result<Option<FieldValue>, BindingError> {
        self.binding(field)?;
        Ok(self.values.remove(field))
    }

    /// Present fields in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldBinding, &FieldValue)> {
        self.schema
            .fields()
            .iter()
            .filter_map(|binding| {
                self.values
                    .get(binding.wire_name())
                    .map(|value| (binding, value))
            })
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.values.is_empty()
    }

    fn binding(&self, field: &str) -> Result<&FieldBinding, BindingError> {
        self.schema
            .resolve(field)
            .ok_or_else(|| BindingError::UnknownField {
                type_name: self.type_name().to_string(),
                field: field.to_string(),
            })
    }

    fn check_kind(&self, binding: &FieldBinding, value: &Value) -> Result<(), BindingError> {
        if !value.matches(binding.kind()) {
            return Err(BindingError::TypeMismatch {
                type_name: self.type_name().to_string(),
                field: binding.wire_name().to_string(),
                expected: binding.kind().to_string(),
                found: value.describe(),
            });
        }

        let unwritable = match value {
            Value::Scalar(scalar) => scalar.check_wire_form().err(),
            Value::Document(nested) if nested.is_empty() => Some(ParseError::Empty),
            Value::Reference(reference) if reference.id().as_str().is_empty() => {
                Some(ParseError::Empty)
            }
            _ => None,
        };
        match unwritable {
            Some(source) => Err(BindingError::InvalidValue {
                type_name: self.type_name().to_string(),
                field: binding.wire_name().to_string(),
                source,
            }),
            None => Ok(()),
        }
    }

    fn cardinality_mismatch(&self, binding: &FieldBinding) -> BindingError {
        BindingError::CardinalityMismatch {
            type_name: self.type_name().to_string(),
            field: binding.wire_name().to_string(),
            repeated: binding.is_repeated(),
        }
    }

    /// Stores an already validated value. Used by the deserializer.
    pub(crate) fn insert_unchecked(&mut self, field: &str, value: FieldValue) {
        self.values.insert(field.to_string(), value);
    }
}

/// Field-wise equality: same type, same id, same values.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.id == other.id && self.values == other.values
    }
}
