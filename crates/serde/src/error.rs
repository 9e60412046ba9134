use indivo_document::{BindingError, RegistryError};

/// Error types for Indivo wire serialization and deserialization.
#[derive(Debug)]
pub enum SerdeError {
    /// JSON syntax error, or JSON that does not follow the element mapping
    Json(serde_json::Error),

    /// XML syntax error
    #[cfg(feature = "xml")]
    Xml(quick_xml::Error),

    /// IO error during serialization/deserialization
    Io(std::io::Error),

    /// The payload names a document type the registry does not know
    Registry(RegistryError),

    /// Well-formed payload whose content does not fit the document schema
    Binding(BindingError),

    /// Custom error message
    Custom(String),
}

impl std::fmt::Display for SerdeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerdeError::Json(e) => write!(f, "JSON error: {}", e),
            #[cfg(feature = "xml")]
            SerdeError::Xml(e) => write!(f, "XML error: {}", e),
            SerdeError::Io(e) => write!(f, "IO error: {}", e),
            SerdeError::Registry(e) => write!(f, "{}", e),
            SerdeError::Binding(e) => write!(f, "{}", e),
            SerdeError::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for SerdeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SerdeError::Json(e) => Some(e),
            #[cfg(feature = "xml")]
            SerdeError::Xml(e) => Some(e),
            SerdeError::Io(e) => Some(e),
            SerdeError::Registry(e) => Some(e),
            SerdeError::Binding(e) => Some(e),
            SerdeError::Custom(_) => None,
        }
    }
}

impl From<serde_json::Error> for SerdeError {
    fn from(err: serde_json::Error) -> Self {
        SerdeError::Json(err)
    }
}

#[cfg(feature = "xml")]
impl From<quick_xml::Error> for SerdeError {
    fn from(err: quick_xml::Error) -> Self {
        SerdeError::Xml(err)
    }
}

impl From<std::io::Error> for SerdeError {
    fn from(err: std::io::Error) -> Self {
        SerdeError::Io(err)
    }
}

impl From<BindingError> for SerdeError {
    fn from(err: BindingError) -> Self {
        SerdeError::Binding(err)
    }
}

// Binding failures surfaced through the registry are reported as binding errors
impl From<RegistryError> for SerdeError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Binding(binding) => SerdeError::Binding(binding),
            other => SerdeError::Registry(other),
        }
    }
}

/// Result type alias for Indivo wire operations
pub type Result<T> = std::result::Result<T, SerdeError>;
