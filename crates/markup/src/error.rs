//! Errors raised by tree-edit APIs.
//!
//! Parsing itself never fails; these only surface when callers edit a
//! [`Document`](crate::Document) in ways the node model cannot represent.

use crate::node::NodeId;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0:?} was removed from the document")]
    StaleNode(NodeId),
    #[error("node {0:?} cannot own children")]
    NotAContainer(NodeId),
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),
    #[error("invalid element name: {0:?}")]
    InvalidName(String),
    #[error("appending {child:?} to {parent:?} would create a cycle")]
    CyclicAppend { parent: NodeId, child: NodeId },
    #[error("the document root cannot be moved or removed")]
    RootNode,
}
