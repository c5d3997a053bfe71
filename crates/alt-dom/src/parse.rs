//! HTML ingress via tree-sitter-html
//!
//! tree-sitter treats inter-node whitespace as extras, so the walker
//! re-inserts the gaps between sibling nodes as text to keep documents
//! byte-stable through a parse/serialize cycle.

use crate::document::Document;
use crate::error::DomError;
use crate::escape::decode_entities;
use crate::node::{Attribute, Element, NodeData, NodeId};
use tree_sitter::{Node as TsNode, Parser};

impl Document {
    /// Parse HTML source into a document
    ///
    /// Malformed markup never fails the parse; tree-sitter recovers and the
    /// walker keeps whatever structure it produced.
    ///
    /// # Errors
    /// - `DomError::Parse` if the grammar cannot be loaded
    pub fn parse(html: &str) -> Result<Self, DomError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_html::LANGUAGE.into())
            .map_err(|e| DomError::Parse(e.to_string()))?;

        let tree = parser
            .parse(html, None)
            .ok_or_else(|| DomError::Parse("parser returned no tree".to_string()))?;

        let mut doc = Document::new();
        let root = doc.root();
        let mut builder = Builder {
            doc: &mut doc,
            src: html.as_bytes(),
        };
        let last = builder.content(tree.root_node(), root, 0)?;
        builder.push_gap(root, last, html.len());

        tracing::trace!(nodes = doc.len(), "parsed html document");
        Ok(doc)
    }
}

struct Builder<'a> {
    doc: &'a mut Document,
    src: &'a [u8],
}

impl Builder<'_> {
    fn text(&self, node: TsNode<'_>) -> &str {
        node.utf8_text(self.src).unwrap_or_default()
    }

    fn slice(&self, start: usize, end: usize) -> &str {
        std::str::from_utf8(&self.src[start..end]).unwrap_or_default()
    }

    fn attach(&mut self, parent: NodeId, data: NodeData) -> Result<NodeId, DomError> {
        let id = self.doc.alloc(data);
        self.doc.append_child(parent, id)?;
        Ok(id)
    }

    /// Whitespace between `start` and `end` becomes a text node
    fn push_gap(&mut self, parent: NodeId, start: usize, end: usize) {
        if end <= start || end > self.src.len() {
            return;
        }
        let gap = self.slice(start, end).to_string();
        if !gap.is_empty() && gap.trim().is_empty() {
            let _ = self.attach(parent, NodeData::Text(gap));
        }
    }

    /// Walk the content children of `node`, starting at byte `pos`
    fn content(
        &mut self,
        node: TsNode<'_>,
        parent: NodeId,
        mut pos: usize,
    ) -> Result<usize, DomError> {
        let mut cursor = node.walk();
        let children: Vec<TsNode<'_>> = node.named_children(&mut cursor).collect();

        for child in children {
            match child.kind() {
                "start_tag" | "self_closing_tag" | "end_tag" | "erroneous_end_tag" => {
                    pos = child.end_byte();
                    continue;
                }
                _ => {}
            }

            self.push_gap(parent, pos, child.start_byte());
            self.node(child, parent)?;
            pos = child.end_byte();
        }

        Ok(pos)
    }

    fn node(&mut self, node: TsNode<'_>, parent: NodeId) -> Result<(), DomError> {
        match node.kind() {
            "doctype" => {
                let raw = self.text(node).to_string();
                self.attach(parent, NodeData::Doctype(raw))?;
            }
            "text" | "entity" => {
                let raw = self.text(node).to_string();
                self.attach(parent, NodeData::Text(raw))?;
            }
            "comment" => {
                let raw = self.text(node).to_string();
                self.attach(parent, NodeData::Comment(raw))?;
            }
            "raw_text" => {
                let raw = self.text(node).to_string();
                self.attach(parent, NodeData::RawText(raw))?;
            }
            "element" | "script_element" | "style_element" => self.element(node, parent)?,
            _ => {
                // ERROR and unknown wrappers: keep whatever children survived
                self.content(node, parent, node.start_byte())?;
            }
        }
        Ok(())
    }

    fn element(&mut self, node: TsNode<'_>, parent: NodeId) -> Result<(), DomError> {
        let mut cursor = node.walk();
        let open = node
            .named_children(&mut cursor)
            .find(|c| matches!(c.kind(), "start_tag" | "self_closing_tag"));

        let Some(open) = open else {
            return self.content(node, parent, node.start_byte()).map(|_| ());
        };

        let element = self.open_tag(open);
        let id = self.attach(parent, NodeData::Element(element))?;

        let last = self.content(node, id, open.end_byte())?;

        // Whitespace before an explicit end tag
        let mut cursor = node.walk();
        if let Some(close) = node
            .named_children(&mut cursor)
            .find(|c| c.kind() == "end_tag")
        {
            self.push_gap(id, last, close.start_byte());
        }
        Ok(())
    }

    fn open_tag(&self, tag: TsNode<'_>) -> Element {
        let mut cursor = tag.walk();
        let mut element = Element::new("");

        for part in tag.named_children(&mut cursor) {
            match part.kind() {
                "tag_name" => element = Element::new(self.text(part)),
                "attribute" => {
                    if let Some(attr) = self.attribute(part) {
                        element.attrs.push(attr);
                    }
                }
                _ => {}
            }
        }

        element
    }

    fn attribute(&self, attr: TsNode<'_>) -> Option<Attribute> {
        let mut cursor = attr.walk();
        let mut name = None;
        let mut value = None;

        for part in attr.named_children(&mut cursor) {
            match part.kind() {
                "attribute_name" => name = Some(self.text(part).to_ascii_lowercase()),
                "attribute_value" => value = Some(decode_entities(self.text(part))),
                "quoted_attribute_value" => {
                    let mut inner = part.walk();
                    let decoded = part
                        .named_children(&mut inner)
                        .find(|c| c.kind() == "attribute_value")
                        .map(|c| decode_entities(self.text(c)))
                        .unwrap_or_default();
                    value = Some(decoded);
                }
                _ => {}
            }
        }

        name.map(|name| Attribute { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_images_and_attributes() {
        let doc = Document::parse(r#"<p><img src="a.jpg" alt="A &amp; B"><img src=b.png alt></p>"#)
            .unwrap();
        let imgs = doc.elements_by_tag("img");
        assert_eq!(imgs.len(), 2);
        assert_eq!(doc.attr(imgs[0], "alt"), Some("A & B"));
        assert_eq!(doc.attr(imgs[1], "src"), Some("b.png"));
        assert_eq!(doc.attr(imgs[1], "alt"), Some(""));
        assert!(!doc.has_attr(doc.root(), "alt"));
    }

    #[test]
    fn empty_quoted_value_is_empty_string() {
        let doc = Document::parse(r#"<img src="a.jpg" alt="">"#).unwrap();
        let img = doc.elements_by_tag("img")[0];
        assert!(doc.has_attr(img, "alt"));
        assert_eq!(doc.attr(img, "alt"), Some(""));
    }

    #[test]
    fn round_trips_formatted_markup() {
        let html = "<!DOCTYPE html>\n<html>\n  <body>\n    <!-- hero -->\n    <p class=\"x\">Hello &amp; welcome</p>\n    <img src=\"a.jpg\" alt=\"\">\n  </body>\n</html>\n";
        let doc = Document::parse(html).unwrap();
        assert_eq!(doc.to_html(), html);
    }

    #[test]
    fn keeps_script_bodies_raw() {
        let html = "<script>if (a < b) { go(); }</script>";
        let doc = Document::parse(html).unwrap();
        assert_eq!(doc.to_html(), html);
    }

    #[test]
    fn nested_structure() {
        let doc = Document::parse(r#"<div id="wpadminbar"><a><img src="x.png"></a></div>"#).unwrap();
        let img = doc.elements_by_tag("img")[0];
        let bar = doc.find_by_id("wpadminbar").unwrap();
        assert!(doc.ancestors(img).any(|a| a == bar));
    }
}
