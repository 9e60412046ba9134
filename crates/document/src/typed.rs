//! Typed document structs over the generic store.
//!
//! [`typed_document!`](crate::typed_document) declares a struct that wraps a
//! [`Document`](crate::Document) of one schema and adds named accessors. The
//! accessors are thin: every getter is a `get` plus a checked conversion and
//! every setter is a `set`, so the schema stays the single source of truth for
//! validation and wire layout.

/// Declares a typed document struct.
///
/// Each field line names the wire field, the getter and setter, the
/// cardinality (`one` or `many`) and the Rust type of one value:
///
/// ```
/// use std::sync::Arc;
/// use once_cell::sync::Lazy;
/// use indivo_document::{typed_document, DocumentSchema, FieldBinding, ScalarKind};
/// use indivo_values::CodedValue;
///
/// static ALLERGY: Lazy<Arc<DocumentSchema>> = Lazy::new(|| {
///     Arc::new(
///         DocumentSchema::define(
///             "Allergy",
///             [
///                 FieldBinding::scalar("allergen", ScalarKind::CodedValue),
///                 FieldBinding::scalar("reaction", ScalarKind::String).repeated(),
///             ],
///         )
///         .expect("allergy schema"),
///     )
/// });
///
/// typed_document! {
///     /// An allergy record.
///     pub struct Allergy("Allergy", ALLERGY) {
///         "allergen" => allergen, set_allergen: one CodedValue;
///         "reaction" => reactions, set_reactions: many String;
///     }
/// }
///
/// let mut allergy = Allergy::new();
/// allergy.set_allergen(Some(CodedValue::new("penicillin")))?;
/// allergy.set_reactions(vec!["hives".to_string()])?;
/// assert_eq!(allergy.allergen().unwrap().code(), "penicillin");
/// assert_eq!(allergy.reactions(), ["hives"]);
/// # Ok::<(), indivo_document::BindingError>(())
/// ```
///
/// The struct dereferences to its [`Document`](crate::Document), so the
/// generic `get`/`set`/`serialize` API stays available.
#[macro_export]
macro_rules! typed_document {
    (@accessor one $(#[$meta:meta])* $wire:literal => $getter:ident, $setter:ident: $ty:ty) => {
        $(#[$meta])*
        pub fn $getter(&self) -> Option<$ty> {
            self.document
                .get($wire)
                .single()
                .and_then(<$ty as $crate::FieldType>::from_value)
        }

        pub fn $setter(&mut self, value: Option<$ty>) -> Result<(), $crate::BindingError> {
            match value {
                Some(value) => self.document.set(
                    $wire,
                    $crate::FieldValue::Single($crate::FieldType::into_value(value)),
                ),
                None => self.document.clear($wire).map(|_| ()),
            }
        }
    };

    (@accessor many $(#[$meta:meta])* $wire:literal => $getter:ident, $setter:ident: $ty:ty) => {
        $(#[$meta])*
        pub fn $getter(&self) -> Vec<$ty> {
            self.document
                .get($wire)
                .values()
                .iter()
                .filter_map(<$ty as $crate::FieldType>::from_value)
                .collect()
        }

        pub fn $setter(&mut self, values: Vec<$ty>) -> Result<(), $crate::BindingError> {
            self.document.set(
                $wire,
                $crate::FieldValue::Repeated(
                    values.into_iter().map($crate::FieldType::into_value).collect(),
                ),
            )
        }
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($type_name:literal, $schema:path) {
            $(
                $(#[$field_meta:meta])*
                $wire:literal => $getter:ident, $setter:ident: $card:ident $ty:ty;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $name {
            document: $crate::Document,
        }

        impl $name {
            /// An empty record with no id.
            pub fn new() -> Self {
                Self {
                    document: $crate::Document::new(::std::sync::Arc::clone(
                        <Self as $crate::TypedDocument>::schema(),
                    )),
                }
            }

            /// Deserializes a wire tree rooted at this type's element.
            pub fn from_wire(wire: &$crate::WireElement) -> Result<Self, $crate::BindingError> {
                $crate::Document::deserialize(wire, <Self as $crate::TypedDocument>::schema())
                    .map(|document| Self { document })
            }

            pub fn as_document(&self) -> &$crate::Document {
                &self.document
            }

            pub fn into_inner(self) -> $crate::Document {
                self.document
            }

            $(
                $crate::typed_document!(@accessor $card $(#[$field_meta])* $wire => $getter, $setter: $ty);
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl ::std::ops::Deref for $name {
            type Target = $crate::Document;

            fn deref(&self) -> &$crate::Document {
                &self.document
            }
        }

        impl ::std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut $crate::Document {
                &mut self.document
            }
        }

        impl $crate::Record for $name {
            fn document(&self) -> &$crate::Document {
                &self.document
            }

            fn document_mut(&mut self) -> &mut $crate::Document {
                &mut self.document
            }

            fn into_document(self: Box<Self>) -> $crate::Document {
                self.document
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn into_any(self: Box<Self>) -> Box<dyn ::std::any::Any> {
                self
            }
        }

        impl $crate::TypedDocument for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn schema() -> &'static ::std::sync::Arc<$crate::DocumentSchema> {
                &$schema
            }

            fn from_document(document: $crate::Document) -> Result<Self, $crate::BindingError> {
                if document.type_name() != $type_name {
                    return Err($crate::BindingError::WrongDocumentType {
                        expected: $type_name.to_string(),
                        found: document.type_name().to_string(),
                    });
                }
                Ok(Self { document })
            }
        }

        impl $crate::FieldType for $name {
            fn from_value(value: &$crate::Value) -> Option<Self> {
                value
                    .as_document()
                    .filter(|document| document.type_name() == $type_name)
                    .map(|document| Self {
                        document: document.clone(),
                    })
            }

            fn into_value(self) -> $crate::Value {
                $crate::Value::Document(self.document)
            }
        }

        impl From<$name> for $crate::Document {
            fn from(record: $name) -> Self {
                record.document
            }
        }

        impl TryFrom<$crate::Document> for $name {
            type Error = $crate::BindingError;

            fn try_from(document: $crate::Document) -> Result<Self, Self::Error> {
                <Self as $crate::TypedDocument>::from_document(document)
            }
        }
    };

}
