//! Mutation Journal
//!
//! Child-list mutation observers. `Document::append_child` reports each
//! insertion to the hub; observers registered against an ancestor root
//! accumulate records until they are drained with `take_records`.

use crate::{DomTree, NodeId};
use std::collections::HashSet;

/// One observed insertion
#[derive(Debug, Clone)]
pub struct MutationRecord {
    /// Parent that received children
    pub target: NodeId,
    /// Nodes inserted under the target
    pub added: Vec<NodeId>,
}

/// Child-list mutation observer (subtree semantics)
#[derive(Debug)]
pub struct MutationObserver {
    id: u64,
    roots: HashSet<NodeId>,
    pending: Vec<MutationRecord>,
}

impl MutationObserver {
    fn new(id: u64) -> Self {
        Self {
            id,
            roots: HashSet::new(),
            pending: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Observe insertions anywhere under `root` (inclusive)
    pub fn observe(&mut self, root: NodeId) {
        self.roots.insert(root);
    }

    /// Stop observing and drop queued records
    pub fn disconnect(&mut self) {
        self.roots.clear();
        self.pending.clear();
    }

    /// Take pending records
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.pending)
    }

    /// Has pending records
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    fn interested_in(&self, tree: &DomTree, target: NodeId) -> bool {
        self.roots
            .iter()
            .any(|&root| tree.is_inclusive_ancestor(root, target))
    }
}

/// Owns all mutation observers for one document
#[derive(Debug, Default)]
pub struct MutationHub {
    observers: Vec<MutationObserver>,
    next_id: u64,
}

impl MutationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new observer, returning its handle
    pub fn create(&mut self) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.observers.push(MutationObserver::new(id));
        id
    }

    /// Get an observer by handle
    pub fn get(&mut self, id: u64) -> Option<&mut MutationObserver> {
        self.observers.iter_mut().find(|o| o.id() == id)
    }

    /// Drop an observer. Unknown handles are ignored.
    pub fn remove(&mut self, id: u64) {
        let before = self.observers.len();
        self.observers.retain(|o| o.id() != id);
        if self.observers.len() == before {
            tracing::debug!(id, "mutation observer already removed");
        }
    }

    /// Report an insertion of `added` under `target`
    pub fn notify_insertion(&mut self, tree: &DomTree, target: NodeId, added: NodeId) {
        for observer in &mut self.observers {
            if observer.interested_in(tree, target) {
                observer.pending.push(MutationRecord {
                    target,
                    added: vec![added],
                });
            }
        }
    }
}
