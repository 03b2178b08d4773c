//! Load State Tracking
//!
//! Membership in a `TrackedSet` is the load record: an element is in
//! the set if and only if this loader instance initiated a load for it.
//! `begin` is the single entry point into the loading state, so a load
//! can start at most once per element.

use std::collections::HashSet;
use vantage_dom::NodeId;

/// Owning set of elements with an initiated load
#[derive(Debug, Default)]
pub struct TrackedSet {
    inner: HashSet<NodeId>,
}

impl TrackedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim an element for loading. Returns false if already claimed.
    pub fn begin(&mut self, node: NodeId) -> bool {
        self.inner.insert(node)
    }

    /// O(1) membership test
    pub fn contains(&self, node: NodeId) -> bool {
        self.inner.contains(&node)
    }

    /// Number of tracked elements
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Forget every tracked element
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_claims_once() {
        let mut set = TrackedSet::new();
        let node = NodeId::from_raw(7);

        assert!(set.begin(node));
        assert!(!set.begin(node));
        assert_eq!(set.len(), 1);
        assert!(set.contains(node));
    }

    #[test]
    fn test_clear() {
        let mut set = TrackedSet::new();
        set.begin(NodeId::from_raw(1));
        set.begin(NodeId::from_raw(2));
        assert_eq!(set.len(), 2);

        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(NodeId::from_raw(1)));
    }
}
