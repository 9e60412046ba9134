//! Values drawn from a coding system.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, Result};

/// A code from a coding system, with optional human-readable text.
///
/// Medication names, routes and frequencies are all coded values: the code
/// identifies the concept (an RxNorm id, say), the system names the
/// vocabulary, and the display text is what a person reads.
/// Parts are stored trimmed, and blank system or display parts are dropped,
/// so a value reads back from the wire exactly as it was built. A blank code
/// cannot be written; [`check_code`](Self::check_code) reports it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "CodedValueParts")]
pub struct CodedValue {
    code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coding_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_text: Option<String>,
}

impl CodedValue {
    /// Creates a coded value with just a code.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: trimmed(code.into()),
            coding_system: None,
            display_text: None,
        }
    }

    pub fn with_system(mut self, coding_system: impl Into<String>) -> Self {
        self.coding_system = non_blank(coding_system.into());
        self
    }

    pub fn with_display(mut self, display_text: impl Into<String>) -> Self {
        self.display_text = non_blank(display_text.into());
        self
    }

    /// Fails with [`ParseError::MissingCode`] when the code is blank.
    pub fn check_code(&self) -> Result<()> {
        if self.code.is_empty() {
            Err(ParseError::MissingCode)
        } else {
            Ok(())
        }
    }

    /// Assembles a coded value from its wire parts.
    ///
    /// A missing or blank code is [`ParseError::MissingCode`]. Blank system
    /// and display parts are dropped.
    pub fn from_parts(
        code: Option<&str>,
        coding_system: Option<&str>,
        display_text: Option<&str>,
    ) -> Result<Self> {
        let code = code
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .ok_or(ParseError::MissingCode)?;

        Ok(Self {
            code: code.to_string(),
            coding_system: coding_system.and_then(|part| non_blank(part.to_string())),
            display_text: display_text.and_then(|part| non_blank(part.to_string())),
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn coding_system(&self) -> Option<&str> {
        self.coding_system.as_deref()
    }

    pub fn display_text(&self) -> Option<&str> {
        self.display_text.as_deref()
    }
}

fn trimmed(text: String) -> String {
    match text.trim() {
        inner if inner.len() == text.len() => text,
        inner => inner.to_string(),
    }
}

fn non_blank(text: String) -> Option<String> {
    Some(trimmed(text)).filter(|text| !text.is_empty())
}

/// Serde form of a coded value before the code is checked.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodedValueParts {
    code: Option<String>,
    #[serde(default)]
    coding_system: Option<String>,
    #[serde(default)]
    display_text: Option<String>,
}

impl TryFrom<CodedValueParts> for CodedValue {
    type Error = ParseError;

    fn try_from(parts: CodedValueParts) -> Result<Self> {
        CodedValue::from_parts(
            parts.code.as_deref(),
            parts.coding_system.as_deref(),
            parts.display_text.as_deref(),
        )
    }
}

impl fmt::Display for CodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.display_text, &self.coding_system) {
            (Some(display), Some(system)) => write!(f, "{} ({}:{})", display, system, self.code),
            (Some(display), None) => write!(f, "{} ({})", display, self.code),
            (None, Some(system)) => write!(f, "{}:{}", system, self.code),
            (None, None) => f.write_str(&self.code),
        }
    }
}
