//! Helpers shared by the XML reader and writer.

use std::borrow::Cow;

use crate::error::{Result, SerdeError};

/// Whether an attribute key declares a namespace.
pub fn is_namespace_declaration(key: &[u8]) -> bool {
    key == b"xmlns" || key.starts_with(b"xmlns:")
}

/// Text for a general entity reference such as `amp` or `#x41`.
pub fn resolve_entity(name: &str) -> Result<Cow<'static, str>> {
    let predefined = match name {
        "amp" => Some("&"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "quot" => Some("\""),
        "apos" => Some("'"),
        _ => None,
    };
    if let Some(text) = predefined {
        return Ok(Cow::Borrowed(text));
    }

    let code = if let Some(hex) = name.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(decimal) = name.strip_prefix('#') {
        decimal.parse::<u32>().ok()
    } else {
        None
    };

    code.and_then(char::from_u32)
        .map(|c| Cow::Owned(c.to_string()))
        .ok_or_else(|| SerdeError::Custom(format!("unknown entity reference &{};", name)))
}

/// Decodes raw bytes as UTF-8. Invalid sequences are an error, never replaced.
pub fn decode_utf8(raw: &[u8]) -> Result<&str> {
    std::str::from_utf8(raw).map_err(|e| SerdeError::Custom(format!("Invalid UTF-8: {}", e)))
}

/// Decodes raw attribute or text bytes and expands entity references in them.
pub fn unescape_bytes(raw: &[u8]) -> Result<String> {
    let text = decode_utf8(raw)?;
    quick_xml::escape::unescape(text)
        .map(Cow::into_owned)
        .map_err(|e| SerdeError::Custom(format!("invalid escape in {:?}: {}", text, e)))
}

/// Character content of a closed element.
///
/// Leaf text is kept verbatim and only empty text is `None`. Between child
/// elements the text is layout, so it is trimmed and dropped when blank.
pub fn element_text(text: String, has_children: bool) -> Option<String> {
    if !has_children {
        return Some(text).filter(|text| !text.is_empty());
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == text.len() {
        Some(text)
    } else {
        Some(trimmed.to_string())
    }
}
