//! HTML egress

use crate::document::Document;
use crate::escape::escape_attr;
use crate::node::{NodeData, NodeId};

/// Elements serialized without a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

impl Document {
    /// Serialize the attached tree back to HTML
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for child in self.children(self.root()) {
            self.write_node(*child, &mut out);
        }
        out
    }

    /// Serialize a single subtree
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            None | Some(NodeData::Root) => {
                for child in self.children(id) {
                    self.write_node(*child, out);
                }
            }
            Some(
                NodeData::Doctype(raw)
                | NodeData::Text(raw)
                | NodeData::Comment(raw)
                | NodeData::RawText(raw),
            ) => out.push_str(raw),
            Some(NodeData::Element(el)) => {
                out.push('<');
                out.push_str(el.tag());
                for attr in el.attrs() {
                    out.push(' ');
                    out.push_str(&attr.name);
                    if let Some(value) = &attr.value {
                        out.push_str("=\"");
                        out.push_str(&escape_attr(value));
                        out.push('"');
                    }
                }
                out.push('>');

                if VOID_ELEMENTS.contains(&el.tag()) {
                    return;
                }

                for child in self.children(id) {
                    self.write_node(*child, out);
                }
                out.push_str("</");
                out.push_str(el.tag());
                out.push('>');
            }
        }
    }
}
