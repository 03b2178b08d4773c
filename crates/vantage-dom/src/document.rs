//! Document - High-level document API

use crate::{DomTree, MutationHub, NodeId, Selector};

/// Dashboard document: DOM tree plus its mutation journal
#[derive(Debug, Default)]
pub struct Document {
    tree: DomTree,
    mutations: MutationHub,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self {
            tree: DomTree::new(),
            mutations: MutationHub::new(),
        }
    }

    /// Root node ID
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Access the mutation hub mutably
    pub fn mutations_mut(&mut self) -> &mut MutationHub {
        &mut self.mutations
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.tree.create_text(content)
    }

    /// Append a child and report the insertion to mutation observers
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.tree.append_child(parent, child);
        self.mutations.notify_insertion(&self.tree, parent, child);
    }

    /// All element nodes, in document order
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.tree
            .descendants(self.root())
            .filter(|&id| self.tree.get(id).is_some_and(|n| n.is_element()))
    }

    /// All elements matching a selector, in document order
    pub fn query_selector_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.elements()
            .filter(|&id| self.matches(id, selector))
            .collect()
    }

    /// Check whether an element matches a selector
    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        self.tree
            .element(id)
            .is_some_and(|elem| selector.matches(elem))
    }

    /// Tag name of an element
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.tree.element(id).map(|e| e.tag.as_str())
    }

    /// Get an attribute value
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.tree.element(id).and_then(|e| e.attr(name))
    }

    /// Check attribute presence
    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.tree.element(id).is_some_and(|e| e.has_attr(name))
    }

    /// Set an attribute. Non-element IDs are ignored.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(elem) = self.tree.element_mut(id) {
            elem.set_attr(name, value);
        }
    }

    /// Remove an attribute, returning its value if it was present
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.tree.element_mut(id).and_then(|e| e.remove_attr(name))
    }

    /// Add a state class
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(elem) = self.tree.element_mut(id) {
            elem.add_class(class);
        }
    }

    /// Remove a state class
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(elem) = self.tree.element_mut(id) {
            elem.remove_class(class);
        }
    }

    /// Check class membership
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.tree.element(id).is_some_and(|e| e.has_class(class))
    }
}
