//! Alt DOM - owned HTML document tree
//!
//! A small arena-backed document model that the auditor and editor mutate
//! in place.
//!
//! # Core Concepts
//!
//! - [`Document`]: arena of nodes addressed by [`NodeId`]
//! - [`NodeData`]: element, text, comment, doctype and raw-text payloads
//! - Ingress via tree-sitter-html ([`Document::parse`])
//! - Egress via [`Document::to_html`]
//!
//! # Example
//!
//! ```rust
//! use alt_dom::Document;
//!
//! let mut doc = Document::parse(r#"<p><img src="a.jpg"></p>"#).unwrap();
//! let img = doc.elements_by_tag("img")[0];
//! doc.set_attr(img, "alt", "A red bicycle").unwrap();
//!
//! assert_eq!(doc.to_html(), r#"<p><img src="a.jpg" alt="A red bicycle"></p>"#);
//! ```

#![warn(unreachable_pub)]

mod document;
mod error;
mod escape;
mod node;
mod parse;
mod serialize;

pub use document::{Ancestors, Descendants, Document};
pub use error::DomError;
pub use escape::{decode_entities, escape_attr, escape_text};
pub use node::{Attribute, Element, NodeData, NodeId};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
