//! Node payloads
//!
//! Provides [`NodeId`], [`NodeData`] and [`Element`].

use std::fmt::{self, Display, Formatter};

/// Index of a node inside its [`Document`](crate::Document) arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw arena index
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// Document root
    Root,
    /// `<!DOCTYPE ...>` verbatim
    Doctype(String),
    /// Element with tag and attributes
    Element(Element),
    /// Character data, stored as escaped markup
    Text(String),
    /// `<!-- ... -->` verbatim
    Comment(String),
    /// Body of `<script>` / `<style>`, never escaped
    RawText(String),
}

/// Single attribute; `value` is `None` for bare attributes such as `<img alt>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lower-cased attribute name
    pub name: String,
    /// Decoded value
    pub value: Option<String>,
}

/// Element payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub(crate) tag: String,
    pub(crate) attrs: Vec<Attribute>,
}

impl Element {
    /// Create element with lower-cased tag
    #[inline]
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    /// Tag name
    #[inline]
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attributes in source order
    #[inline]
    #[must_use]
    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    /// Attribute value; bare attributes read as `""`
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_deref().unwrap_or(""))
    }

    /// Check attribute presence
    #[inline]
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Set or replace an attribute, keeping its position when present
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = Some(value.into());
        match self
            .attrs
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(name))
        {
            Some(existing) => existing.value = value,
            None => self.attrs.push(Attribute {
                name: name.to_ascii_lowercase(),
                value,
            }),
        }
    }

    /// Remove an attribute, returning whether it was present
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|a| !a.name.eq_ignore_ascii_case(name));
        before != self.attrs.len()
    }

    /// Iterate whitespace-separated classes
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    /// Check class membership
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Add class if missing
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{} {class}", existing.trim_end())
            }
            _ => class.to_string(),
        };
        self.set_attr("class", joined);
    }

    /// Remove class if present; drops the attribute when it becomes empty
    pub fn remove_class(&mut self, class: &str) {
        if !self.has_class(class) {
            return;
        }
        let remaining: Vec<&str> = self.classes().filter(|c| *c != class).collect();
        if remaining.is_empty() {
            self.remove_attr("class");
        } else {
            let joined = remaining.join(" ");
            self.set_attr("class", joined);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_attribute_reads_empty() {
        let mut el = Element::new("IMG");
        el.attrs.push(Attribute {
            name: "alt".into(),
            value: None,
        });
        assert_eq!(el.tag(), "img");
        assert!(el.has_attr("ALT"));
        assert_eq!(el.attr("alt"), Some(""));
    }

    #[test]
    fn class_add_remove() {
        let mut el = Element::new("img");
        el.add_class("a");
        el.add_class("b");
        el.add_class("a");
        assert_eq!(el.attr("class"), Some("a b"));

        el.remove_class("a");
        assert_eq!(el.attr("class"), Some("b"));
        el.remove_class("b");
        assert!(!el.has_attr("class"));
    }

    #[test]
    fn set_attr_keeps_position() {
        let mut el = Element::new("img");
        el.set_attr("src", "a.jpg");
        el.set_attr("alt", "");
        el.set_attr("src", "b.jpg");
        let names: Vec<_> = el.attrs().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["src", "alt"]);
        assert_eq!(el.attr("src"), Some("b.jpg"));
    }
}
