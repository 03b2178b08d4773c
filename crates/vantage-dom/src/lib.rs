//! Vantage DOM - Document Object Model
//!
//! Arena-based DOM tree the dashboard widgets render into. Provides
//! element attributes, class lists, simple selector matching, and a
//! child-list mutation journal for code that reacts to inserted nodes.

mod node;
mod tree;
mod selector;
mod mutation;
mod document;

pub use node::{Node, NodeData, Element, Attribute};
pub use tree::DomTree;
pub use selector::{Selector, SelectorError};
pub use mutation::{MutationRecord, MutationObserver, MutationHub};
pub use document::Document;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Document root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Check that this ID refers to a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Build an ID from a raw index (tests and tooling)
    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        NodeId(raw)
    }

    /// Raw arena index
    #[inline]
    pub fn to_raw(self) -> u32 {
        self.0
    }
}
