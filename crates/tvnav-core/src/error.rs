//! Error types.
//!
//! Navigation never produces an error: running out of candidates is the
//! normal "edge of the layout" case and yields `None`. Errors exist only for
//! structural edits of a [`FocusTree`](crate::tree::FocusTree) and for
//! parsing configuration.

use thiserror::Error;

use crate::tree::NodeId;

/// A structural edit of the focus tree was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The id does not name a live node (never existed or was removed).
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Focusable leaves cannot have children.
    #[error("node {0} is a focusable leaf and cannot hold children")]
    LeafParent(NodeId),

    /// Re-parenting `node` under `parent` would make it its own ancestor.
    #[error("moving node {node} under {parent} would create a cycle")]
    Cycle { node: NodeId, parent: NodeId },

    /// The root has no parent to detach from.
    #[error("the root node cannot be removed or moved")]
    RootRemoval,
}

/// A configuration directive or value could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },

    /// `:set name`, `:set noname` and `:set name!` only apply to booleans.
    #[error("not a boolean option: {0}")]
    NotBoolean(String),
}
