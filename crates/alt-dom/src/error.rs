//! Error types for document operations

use crate::node::NodeId;

/// Errors raised while parsing or mutating a [`Document`](crate::Document)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// The HTML grammar could not be loaded or produced no tree
    #[error("html parse failed: {0}")]
    Parse(String),

    /// Node id does not belong to this document
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// Operation requires an element node
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    /// Reference node is not a child of the given parent
    #[error("node {child} is not a child of {parent}")]
    NotAChild {
        /// Expected parent
        parent: NodeId,
        /// Offending node
        child: NodeId,
    },

    /// Insertion would make a node its own ancestor
    #[error("inserting {child} under {parent} would create a cycle")]
    Cycle {
        /// Target parent
        parent: NodeId,
        /// Node being inserted
        child: NodeId,
    },

    /// The root node cannot be moved or wrapped
    #[error("the document root cannot be moved")]
    RootImmovable,
}
