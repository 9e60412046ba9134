//! Type-name keyed factories for document types.
//!
//! A [`DocumentRegistry`] maps the root element name of a payload to the
//! schema and constructor of the matching document type. It is assembled once
//! through a [`RegistryBuilder`] and read-only afterwards, so it can be shared
//! across threads without locking.
//!
//! ```
//! use std::sync::Arc;
//! use indivo_document::{DocumentRegistry, DocumentSchema, FieldBinding, ScalarKind, WireElement};
//!
//! let allergy = Arc::new(DocumentSchema::define(
//!     "Allergy",
//!     [FieldBinding::scalar("reaction", ScalarKind::String)],
//! )?);
//! let registry = DocumentRegistry::builder().define(allergy)?.build()?;
//!
//! let wire = WireElement::new("Allergy")
//!     .with_child(WireElement::new("reaction").with_text("hives"));
//! let record = registry.dispatch(&wire)?;
//! assert_eq!(record.type_name(), "Allergy");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use tracing::debug;

use crate::binding::BindingOptions;
use crate::document::Document;
use crate::error::{BindingError, RegistryError, SchemaError};
use crate::schema::{DocumentSchema, FieldKind};
use crate::wire::WireElement;

/// A document instance of some registered type.
///
/// Generic documents and the structs produced by
/// [`typed_document!`](crate::typed_document) both implement it. Use the
/// `downcast` helpers on `dyn Record` to get the concrete type back.
pub trait Record: Any + Debug + Send + Sync {
    fn document(&self) -> &Document;

    fn document_mut(&mut self) -> &mut Document;

    fn into_document(self: Box<Self>) -> Document;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl dyn Record {
    pub fn type_name(&self) -> &str {
        self.document().type_name()
    }

    pub fn is<T: Record>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Record>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Recovers the concrete record, or `None` when it is another type.
    pub fn downcast<T: Record>(self: Box<Self>) -> Option<Box<T>> {
        self.into_any().downcast::<T>().ok()
    }
}

impl Record for Document {
    fn document(&self) -> &Document {
        self
    }

    fn document_mut(&mut self) -> &mut Document {
        self
    }

    fn into_document(self: Box<Self>) -> Document {
        *self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A record type with a fixed schema and typed accessors.
pub trait TypedDocument: Record + Sized {
    const TYPE_NAME: &'static str;

    fn schema() -> &'static Arc<DocumentSchema>;

    /// Wraps a generic document. Fails with
    /// [`BindingError::WrongDocumentType`] when it is of another type.
    fn from_document(document: Document) -> Result<Self, BindingError>;
}

/// Builds a record from a deserialized document.
pub type Factory = fn(Document) -> Result<Box<dyn Record>, BindingError>;

fn generic_factory(document: Document) -> Result<Box<dyn Record>, BindingError> {
    Ok(Box::new(document))
}

fn typed_factory<T: TypedDocument>(document: Document) -> Result<Box<dyn Record>, BindingError> {
    Ok(Box::new(T::from_document(document)?))
}

#[derive(Debug, Clone)]
struct Entry {
    schema: Arc<DocumentSchema>,
    factory: Factory,
}

/// Collects document types before the registry is frozen.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl RegistryBuilder {
    /// Registers `schema` with a custom factory.
    pub fn register(
        mut self,
        schema: Arc<DocumentSchema>,
        factory: Factory,
    ) -> Result<Self, SchemaError> {
        let type_name = schema.type_name().to_string();
        if self.index.contains_key(&type_name) {
            return Err(SchemaError::AlreadyRegistered { type_name });
        }
        debug!(type_name = %type_name, fields = schema.fields().len(), "registering document type");
        self.index.insert(type_name, self.entries.len());
        self.entries.push(Entry { schema, factory });
        Ok(self)
    }

    /// Registers a [`TypedDocument`]; `create` returns that struct.
    pub fn register_typed<T: TypedDocument>(self) -> Result<Self, SchemaError> {
        self.register(Arc::clone(T::schema()), typed_factory::<T>)
    }

    /// Registers a schema whose records are plain [`Document`]s.
    pub fn define(self, schema: Arc<DocumentSchema>) -> Result<Self, SchemaError> {
        self.register(schema, generic_factory)
    }

    /// Freezes the registry after checking that every reference field points
    /// at a registered type, including those of nested schemas.
    pub fn build(self) -> Result<DocumentRegistry, SchemaError> {
        for entry in &self.entries {
            self.check_references(&entry.schema)?;
        }
        Ok(DocumentRegistry {
            entries: self.entries,
            index: self.index,
        })
    }

    fn check_references(&self, schema: &DocumentSchema) -> Result<(), SchemaError> {
        for field in schema.fields() {
            match field.kind() {
                FieldKind::Reference(target) if !self.index.contains_key(target) => {
                    return Err(SchemaError::UnresolvedReference {
                        type_name: schema.type_name().to_string(),
                        field: field.wire_name().to_string(),
                        target: target.clone(),
                    });
                }
                FieldKind::Document(nested) => self.check_references(nested)?,
                _ => {}
            }
        }
        Ok(())
    }
}

/// Read-only map from type name to schema and factory.
#[derive(Debug)]
pub struct DocumentRegistry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl DocumentRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn schema(&self, type_name: &str) -> Option<&Arc<DocumentSchema>> {
        self.entry(type_name).map(|entry| &entry.schema)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.index.contains_key(type_name)
    }

    /// Registered type names in registration order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.schema.type_name())
    }

    /// Deserializes `wire` as a `type_name` document and builds its record.
    pub fn create(
        &self,
        type_name: &str,
        wire: &WireElement,
    ) -> Result<Box<dyn Record>, RegistryError> {
        self.create_with(type_name, wire, &BindingOptions::default())
    }

    pub fn create_with(
        &self,
        type_name: &str,
        wire: &WireElement,
        options: &BindingOptions,
    ) -> Result<Box<dyn Record>, RegistryError> {
        let entry = self.entry(type_name).ok_or_else(|| unknown(type_name))?;
        let document = Document::deserialize_with(wire, &entry.schema, options)?;
        Ok((entry.factory)(document)?)
    }

    /// Like [`create`](Self::create), taking the type from the root element name.
    pub fn dispatch(&self, wire: &WireElement) -> Result<Box<dyn Record>, RegistryError> {
        self.create(&wire.name, wire)
    }

    pub fn dispatch_with(
        &self,
        wire: &WireElement,
        options: &BindingOptions,
    ) -> Result<Box<dyn Record>, RegistryError> {
        self.create_with(&wire.name, wire, options)
    }

    /// An empty document of a registered type.
    pub fn new_document(&self, type_name: &str) -> Result<Document, RegistryError> {
        self.schema(type_name)
            .map(|schema| Document::new(Arc::clone(schema)))
            .ok_or_else(|| unknown(type_name))
    }

    fn entry(&self, type_name: &str) -> Option<&Entry> {
        self.index.get(type_name).map(|&position| &self.entries[position])
    }
}

fn unknown(type_name: &str) -> RegistryError {
    RegistryError::UnknownType {
        type_name: type_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldBinding;
    use indivo_values::ScalarKind;

    fn contact() -> Arc<DocumentSchema> {
        Arc::new(
            DocumentSchema::define(
                "Contact",
                [FieldBinding::scalar("fullName", ScalarKind::String).required()],
            )
            .unwrap(),
        )
    }

    fn prescription() -> Arc<DocumentSchema> {
        Arc::new(
            DocumentSchema::define(
                "Prescription",
                [FieldBinding::reference("by", "Contact")],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_register_twice() {
        let err = DocumentRegistry::builder()
            .define(contact())
            .unwrap()
            .define(contact())
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::AlreadyRegistered {
                type_name: "Contact".to_string()
            }
        );
    }

    #[test]
    fn test_unresolved_reference() {
        let err = DocumentRegistry::builder()
            .define(prescription())
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedReference { ref target, .. } if target == "Contact"));

        let registry = DocumentRegistry::builder()
            .define(prescription())
            .unwrap()
            .define(contact())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(registry.type_names().collect::<Vec<_>>(), ["Prescription", "Contact"]);
    }

    #[test]
    fn test_create_and_dispatch() {
        let registry = DocumentRegistry::builder()
            .define(contact())
            .unwrap()
            .build()
            .unwrap();
        let wire = WireElement::new("Contact")
            .with_child(WireElement::new("fullName").with_text("Jane Doe"));

        let record = registry.dispatch(&wire).unwrap();
        assert!(record.is::<Document>());
        let document = record.downcast::<Document>().unwrap();
        assert_eq!(
            document.get("fullName").scalar().and_then(|s| s.as_str()),
            Some("Jane Doe")
        );

        assert_eq!(
            registry.create("Allergy", &wire).unwrap_err(),
            RegistryError::UnknownType {
                type_name: "Allergy".to_string()
            }
        );
        assert!(matches!(
            registry.create("Contact", &WireElement::new("Contact")),
            Err(RegistryError::Binding(BindingError::MissingRequired { .. }))
        ));
    }

    #[test]
    fn test_new_document() {
        let registry = DocumentRegistry::builder()
            .define(contact())
            .unwrap()
            .build()
            .unwrap();
        let document = registry.new_document("Contact").unwrap();
        assert!(document.is_empty());
        assert!(registry.new_document("Nope").is_err());
        assert!(registry.contains("Contact"));
    }
}
