//! Arena-backed document tree
//!
//! Nodes are never freed; detached nodes stay in the arena and simply stop
//! being reachable from the root.

use crate::error::DomError;
use crate::escape::{decode_entities, escape_text};
use crate::node::{Element, NodeData, NodeId};

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Owned HTML document
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only the root
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Root)],
        }
    }

    /// Root node id
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes ever allocated (attached or not)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether the document holds nothing but the root
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(id.0).ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes.get_mut(id.0).ok_or(DomError::UnknownNode(id))
    }

    /// Node payload
    #[must_use]
    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0).map(|n| &n.data)
    }

    /// Element payload, if `id` is an element
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.data(id) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element(el) => Ok(el),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    /// Tag name, if `id` is an element
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::tag)
    }

    /// Check whether `id` is an element with the given tag
    #[must_use]
    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id).is_some_and(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Parent of `id`
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// Children of `id` in order
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.0).map_or(&[], |n| n.children.as_slice())
    }

    /// Check whether `id` is reachable from the root
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root() || self.ancestors(id).any(|a| a == self.root())
    }

    // ---------------------------------------------------------------
    // Construction and mutation
    // ---------------------------------------------------------------

    pub(crate) fn alloc(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node::new(data));
        NodeId(self.nodes.len() - 1)
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element(Element::new(tag)))
    }

    /// Create a detached text node; `text` is escaped
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(escape_text(text)))
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.node(parent)?;
        self.node(child)?;
        if child == self.root() {
            return Err(DomError::RootImmovable);
        }
        if parent == child || self.ancestors(parent).any(|a| a == child) {
            return Err(DomError::Cycle { parent, child });
        }
        Ok(())
    }

    /// Append `child` as the last child of `parent`, detaching it first
    ///
    /// # Errors
    /// - `DomError::UnknownNode` if either id is foreign
    /// - `DomError::Cycle` if `child` is an ancestor of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Insert `child` before `reference` under `parent`
    ///
    /// # Errors
    /// - `DomError::NotAChild` if `reference` is not a child of `parent`
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        if self.parent(reference) != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                child: reference,
            });
        }
        self.detach(child);
        let pos = self.nodes[parent.0]
            .children
            .iter()
            .position(|c| *c == reference)
            .ok_or(DomError::NotAChild {
                parent,
                child: reference,
            })?;
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(pos, child);
        Ok(())
    }

    /// Detach `id` from its parent; no-op for detached nodes
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.nodes[parent.0].children.retain(|c| *c != id);
        self.nodes[id.0].parent = None;
    }

    /// Put `wrapper` where `target` is and move `target` into it
    ///
    /// # Errors
    /// - `DomError::RootImmovable` when wrapping the root
    /// - `DomError::NotAChild` when `target` is detached
    pub fn wrap(&mut self, target: NodeId, wrapper: NodeId) -> Result<(), DomError> {
        if target == self.root() {
            return Err(DomError::RootImmovable);
        }
        let parent = self.parent(target).ok_or(DomError::NotAChild {
            parent: self.root(),
            child: target,
        })?;
        self.insert_before(parent, wrapper, target)?;
        self.append_child(wrapper, target)
    }

    /// Replace every child of `id` with a single text node
    ///
    /// # Errors
    /// - `DomError::UnknownNode` if `id` is foreign
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        let old: Vec<NodeId> = self.node(id)?.children.clone();
        for child in old {
            self.detach(child);
        }
        let text = self.create_text(text);
        self.append_child(id, text)
    }

    // ---------------------------------------------------------------
    // Attributes and classes
    // ---------------------------------------------------------------

    /// Attribute value of an element
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    /// Check attribute presence
    #[must_use]
    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_attr(name))
    }

    /// Set attribute on an element
    ///
    /// # Errors
    /// - `DomError::NotAnElement` if `id` is not an element
    pub fn set_attr(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        self.element_mut(id)?.set_attr(name, value);
        Ok(())
    }

    /// Remove attribute from an element
    ///
    /// # Errors
    /// - `DomError::NotAnElement` if `id` is not an element
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Result<bool, DomError> {
        Ok(self.element_mut(id)?.remove_attr(name))
    }

    /// Check class membership
    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_class(class))
    }

    /// Add a class
    ///
    /// # Errors
    /// - `DomError::NotAnElement` if `id` is not an element
    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        self.element_mut(id)?.add_class(class);
        Ok(())
    }

    /// Remove a class
    ///
    /// # Errors
    /// - `DomError::NotAnElement` if `id` is not an element
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        self.element_mut(id)?.remove_class(class);
        Ok(())
    }

    // ---------------------------------------------------------------
    // Traversal and queries
    // ---------------------------------------------------------------

    /// Pre-order descendants of `id`, excluding `id`
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// Ancestors of `id` from parent up to the root
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// Closest element (starting at `id`) matching `pred`
    pub fn closest<F>(&self, id: NodeId, mut pred: F) -> Option<NodeId>
    where
        F: FnMut(&Element) -> bool,
    {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|n| self.element(*n).is_some_and(&mut pred))
    }

    /// All attached elements with the given tag, in document order
    #[must_use]
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .filter(|n| self.is_tag(*n, tag))
            .collect()
    }

    /// First attached element whose `id` attribute equals `value`
    #[must_use]
    pub fn find_by_id(&self, value: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .find(|n| self.attr(*n, "id") == Some(value))
    }

    /// First descendant of `scope` carrying `class`
    #[must_use]
    pub fn find_by_class(&self, scope: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(scope).find(|n| self.has_class(*n, class))
    }

    /// All descendants of `scope` carrying `class`
    #[must_use]
    pub fn all_by_class(&self, scope: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .filter(|n| self.has_class(*n, class))
            .collect()
    }

    /// Decoded text of `id` and its descendants
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for n in std::iter::once(id).chain(self.descendants(id)) {
            match self.data(n) {
                Some(NodeData::Text(raw)) => out.push_str(&decode_entities(raw)),
                Some(NodeData::RawText(raw)) => out.push_str(raw),
                _ => {}
            }
        }
        out
    }

    /// `<head>` element, if any
    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        self.elements_by_tag("head").into_iter().next()
    }

    /// `<body>` element, if any
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        self.elements_by_tag("body").into_iter().next()
    }

    /// `<body>` when present, otherwise the root
    #[must_use]
    pub fn body_or_root(&self) -> NodeId {
        self.body().unwrap_or_else(|| self.root())
    }
}

/// Pre-order iterator over descendants
#[derive(Debug)]
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Iterator from parent to root
#[derive(Debug)]
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.doc.parent(id);
        Some(id)
    }
}
