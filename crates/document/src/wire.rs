//! Format-neutral wire tree.
//!
//! [`WireElement`] is what documents serialize to and deserialize from. The
//! XML and JSON layers only translate between their text form and this tree,
//! so the binding rules live in one place.

/// One element of a wire payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WireElement {
    /// Local element name, without namespace prefix.
    pub name: String,
    /// Attributes in document order. Namespace declarations are not kept.
    pub attributes: Vec<(String, String)>,
    /// Character content, if any.
    pub text: Option<String>,
    /// Child elements in document order.
    pub children: Vec<WireElement>,
}

impl WireElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_attribute(name, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: WireElement) -> Self {
        self.children.push(child);
        self
    }

    /// Sets an attribute, replacing an earlier value with the same name.
    pub fn push_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a WireElement> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Text content with surrounding whitespace removed; `None` when blank.
    pub fn trimmed_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// True when the element carries nothing at all: no attributes, no
    /// children and no non-blank text.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty() && self.trimmed_text().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_attribute_replaces() {
        let mut element = WireElement::new("name").with_attribute("code", "1");
        element.push_attribute("code", "2");
        element.push_attribute("codingSystem", "rxnorm");
        assert_eq!(element.attribute("code"), Some("2"));
        assert_eq!(element.attributes.len(), 2);
    }

    #[test]
    fn test_children_named() {
        let element = WireElement::new("Contact")
            .with_child(WireElement::new("email").with_text("a@example.org"))
            .with_child(WireElement::new("fullName").with_text("A"))
            .with_child(WireElement::new("email").with_text("b@example.org"));
        let emails: Vec<_> = element
            .children_named("email")
            .filter_map(WireElement::trimmed_text)
            .collect();
        assert_eq!(emails, ["a@example.org", "b@example.org"]);
    }

    #[test]
    fn test_is_empty_ignores_whitespace() {
        assert!(WireElement::new("dateStopped").with_text(" \n ").is_empty());
        assert!(!WireElement::new("dateStopped").with_text("2020-01-01").is_empty());
        assert!(!WireElement::new("by").with_attribute("id", "c1").is_empty());
    }
}
