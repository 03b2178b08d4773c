//! DOM Tree (arena-based allocation)

use crate::node::Element;
use crate::{Node, NodeId};

/// Arena-based DOM tree. Node 0 is always the document root.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new tree containing only the document root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// Root node ID
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if !id.is_valid() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if !id.is_valid() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Get element data for a node
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.get(id).and_then(Node::as_element)
    }

    /// Get mutable element data for a node
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Create a detached element node
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content.to_string()))
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// Build-only tree: the child is expected to be detached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.get(parent).is_none() || self.get(child).is_none() {
            return;
        }
        let prev_last = self.nodes[parent.0 as usize].last_child;
        if prev_last.is_valid() {
            self.nodes[prev_last.0 as usize].next_sibling = child;
            self.nodes[child.0 as usize].prev_sibling = prev_last;
        } else {
            self.nodes[parent.0 as usize].first_child = child;
        }
        self.nodes[parent.0 as usize].last_child = child;
        self.nodes[child.0 as usize].parent = parent;
    }

    /// Iterate direct children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let first = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Children { tree: self, next: first }
    }

    /// Iterate all descendants of a node in preorder (excluding the node itself)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack = Vec::new();
        // Push children in reverse so the first child pops first
        let children: Vec<NodeId> = self.children(id).collect();
        for child in children.into_iter().rev() {
            stack.push(child);
        }
        Descendants { tree: self, stack }
    }

    /// Check whether `ancestor` is `node` itself or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while current.is_valid() {
            if current == ancestor {
                return true;
            }
            current = match self.get(current) {
                Some(n) => n.parent,
                None => return false,
            };
        }
        false
    }

    /// Number of nodes in the tree (including the root)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree holds only the root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.next.is_valid() {
            return None;
        }
        let current = self.next;
        self.next = self.tree.get(current).map(|n| n.next_sibling).unwrap_or(NodeId::NONE);
        Some(current)
    }
}

/// Preorder iterator over descendants
pub struct Descendants<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        let children: Vec<NodeId> = self.tree.children(current).collect();
        for child in children.into_iter().rev() {
            self.stack.push(child);
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_children() {
        let mut tree = DomTree::new();
        let a = tree.create_element("div");
        let b = tree.create_element("span");
        let c = tree.create_element("img");
        tree.append_child(tree.root(), a);
        tree.append_child(a, b);
        tree.append_child(a, c);

        let kids: Vec<NodeId> = tree.children(a).collect();
        assert_eq!(kids, vec![b, c]);
        assert_eq!(tree.get(b).unwrap().parent, a);
        assert_eq!(tree.get(a).unwrap().last_child, c);
    }

    #[test]
    fn test_descendants_preorder() {
        let mut tree = DomTree::new();
        let a = tree.create_element("div");
        let b = tree.create_element("section");
        let c = tree.create_element("img");
        let d = tree.create_element("span");
        tree.append_child(tree.root(), a);
        tree.append_child(a, b);
        tree.append_child(b, c);
        tree.append_child(a, d);

        let order: Vec<NodeId> = tree.descendants(tree.root()).collect();
        assert_eq!(order, vec![a, b, c, d]);

        let sub: Vec<NodeId> = tree.descendants(a).collect();
        assert_eq!(sub, vec![b, c, d]);
    }

    #[test]
    fn test_inclusive_ancestor() {
        let mut tree = DomTree::new();
        let a = tree.create_element("div");
        let b = tree.create_element("img");
        tree.append_child(tree.root(), a);
        tree.append_child(a, b);

        assert!(tree.is_inclusive_ancestor(tree.root(), b));
        assert!(tree.is_inclusive_ancestor(a, b));
        assert!(tree.is_inclusive_ancestor(b, b));
        assert!(!tree.is_inclusive_ancestor(b, a));
    }

    #[test]
    fn test_invalid_ids_are_safe() {
        let mut tree = DomTree::new();
        assert!(tree.get(NodeId::NONE).is_none());
        tree.append_child(NodeId::NONE, NodeId::from_raw(99));
        assert_eq!(tree.len(), 1);
    }
}
