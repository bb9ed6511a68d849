use arbor_core::BlackboardError;
use thiserror::Error;
use uuid::Uuid;

use crate::bt::NodeKind;

/// Malformed node graph. Detected when an instance is bound; binding is aborted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("tree has no root node")]
    MissingRoot,

    #[error("tree has more than one root node ({count})")]
    MultipleRoots { count: usize },

    #[error("node {parent} references a child that does not exist")]
    DanglingChild { parent: Uuid },

    #[error("node {node} is a child of more than one parent")]
    MultipleParents { node: Uuid },

    #[error("cycle through node {node}")]
    Cycle { node: Uuid },

    #[error("{kind} node {node} cannot own {count} children")]
    InvalidChildCount {
        node: Uuid,
        kind: NodeKind,
        count: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    Blackboard(#[from] BlackboardError),

    #[error("no node with id {0}")]
    UnknownNode(crate::NodeId),

    #[error("unknown node type '{0}'")]
    UnknownNodeType(String),

    #[error("a node with guid {0} already exists")]
    DuplicateNode(Uuid),

    #[error("the root node cannot be deleted or re-parented")]
    RootNode,

    #[error("{kind} nodes cannot have children")]
    ChildNotAllowed { kind: NodeKind },

    #[error("node is not a child of the given parent")]
    NotAChild,

    #[error("tree instance is bound; only templates can be edited")]
    BoundInstance,

    #[error("tree instance is already bound")]
    AlreadyBound,

    #[error("property '{property}' of {node_type} is invalid: {reason}")]
    InvalidProperty {
        node_type: &'static str,
        property: String,
        reason: String,
    },

    #[error("no shared blackboard named '{0}'")]
    UnknownSharedBlackboard(String),
}

pub type Result<T> = std::result::Result<T, TreeError>;
