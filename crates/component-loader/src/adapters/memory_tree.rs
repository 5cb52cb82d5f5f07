//! In-memory node tree
//!
//! A minimal element tree for hosts without a real document and for tests.
//! Nodes are never freed: a removed node is only detached, so its handle
//! stays valid and can be re-attached.

use std::cell::RefCell;

use crate::domain::NodeHandle;
use crate::ports::NodeTree;

#[derive(Debug, Clone, Default)]
struct MemoryNode {
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
    attributes: Vec<(String, String)>,
    hidden: bool,
}

/// Element tree rooted at `NodeHandle(0)`.
#[derive(Debug)]
pub struct MemoryTree {
    nodes: RefCell<Vec<MemoryNode>>,
}

const ROOT: NodeHandle = NodeHandle(0);

impl MemoryTree {
    /// Tree holding only the root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: RefCell::new(vec![MemoryNode::default()]),
        }
    }

    /// Tree with one root child per marker value, in order.
    pub fn from_markers(markers: &[&str]) -> (Self, Vec<NodeHandle>) {
        let tree = Self::new();
        let nodes = markers
            .iter()
            .map(|marker| tree.append(ROOT, &[("data-component", *marker)]))
            .collect();
        (tree, nodes)
    }

    /// Create a detached node.
    pub fn create_element(&self, attributes: &[(&str, &str)]) -> NodeHandle {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(MemoryNode {
            attributes: attributes
                .iter()
                .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
                .collect(),
            ..MemoryNode::default()
        });
        NodeHandle(nodes.len() - 1)
    }

    /// Create a node and attach it as the last child of `parent`.
    pub fn append(&self, parent: NodeHandle, attributes: &[(&str, &str)]) -> NodeHandle {
        let node = self.create_element(attributes);
        self.append_child(parent, node);
        node
    }

    /// Move `child` to the end of `parent`'s children.
    ///
    /// Refused (`false`) for unknown handles, the root, or when `child` is
    /// `parent` or one of its ancestors.
    pub fn append_child(&self, parent: NodeHandle, child: NodeHandle) -> bool {
        if child == ROOT || !self.exists(parent) || !self.exists(child) {
            return false;
        }
        if self.ancestors(parent).contains(&child) || parent == child {
            return false;
        }

        self.remove(child);
        let mut nodes = self.nodes.borrow_mut();
        nodes[child.0].parent = Some(parent);
        nodes[parent.0].children.push(child);
        true
    }

    /// Detach `node` from its parent. `false` if it was not attached.
    pub fn remove(&self, node: NodeHandle) -> bool {
        let mut nodes = self.nodes.borrow_mut();
        let Some(parent) = nodes.get_mut(node.0).and_then(|n| n.parent.take()) else {
            return false;
        };
        nodes[parent.0].children.retain(|child| *child != node);
        true
    }

    /// Copy `node` and its attributes, and with `deep` its whole subtree.
    /// The copy is detached.
    pub fn clone_node(&self, node: NodeHandle, deep: bool) -> Option<NodeHandle> {
        let (attributes, hidden, children) = {
            let nodes = self.nodes.borrow();
            let source = nodes.get(node.0)?;
            (
                source.attributes.clone(),
                source.hidden,
                source.children.clone(),
            )
        };

        let copy = {
            let mut nodes = self.nodes.borrow_mut();
            nodes.push(MemoryNode {
                attributes,
                hidden,
                ..MemoryNode::default()
            });
            NodeHandle(nodes.len() - 1)
        };

        if deep {
            for child in children {
                if let Some(child_copy) = self.clone_node(child, true) {
                    self.append_child(copy, child_copy);
                }
            }
        }
        Some(copy)
    }

    /// Hide or show `node` and, through it, its subtree.
    pub fn set_hidden(&self, node: NodeHandle, hidden: bool) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(node.0) {
            n.hidden = hidden;
        }
    }

    pub fn remove_attribute(&self, node: NodeHandle, name: &str) -> bool {
        let mut nodes = self.nodes.borrow_mut();
        let Some(n) = nodes.get_mut(node.0) else {
            return false;
        };
        let before = n.attributes.len();
        n.attributes.retain(|(key, _)| key != name);
        n.attributes.len() != before
    }

    /// Whether `node` is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, node: NodeHandle) -> bool {
        node == ROOT || self.ancestors(node).last() == Some(&ROOT)
    }

    #[must_use]
    pub fn parent(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.nodes.borrow().get(node.0).and_then(|n| n.parent)
    }

    #[must_use]
    pub fn children(&self, node: NodeHandle) -> Vec<NodeHandle> {
        self.nodes
            .borrow()
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Nodes ever created, detached ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    fn exists(&self, node: NodeHandle) -> bool {
        node.0 < self.nodes.borrow().len()
    }

    /// Parent chain of `node`, nearest first.
    fn ancestors(&self, node: NodeHandle) -> Vec<NodeHandle> {
        let nodes = self.nodes.borrow();
        let mut chain = Vec::new();
        let mut current = nodes.get(node.0).and_then(|n| n.parent);
        while let Some(parent) = current {
            chain.push(parent);
            current = nodes[parent.0].parent;
        }
        chain
    }
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree for MemoryTree {
    fn root(&self) -> NodeHandle {
        ROOT
    }

    fn query_marked(&self, context: NodeHandle, attribute: &str) -> Vec<NodeHandle> {
        let nodes = self.nodes.borrow();
        let Some(start) = nodes.get(context.0) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        let mut stack: Vec<NodeHandle> = start.children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            let n = &nodes[node.0];
            if n.attributes.iter().any(|(name, _)| name == attribute) {
                found.push(node);
            }
            stack.extend(n.children.iter().rev().copied());
        }
        found
    }

    fn attribute(&self, node: NodeHandle, name: &str) -> Option<String> {
        self.nodes.borrow().get(node.0).and_then(|n| {
            n.attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        })
    }

    fn set_attribute(&self, node: NodeHandle, name: &str, value: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let Some(n) = nodes.get_mut(node.0) else {
            return;
        };
        match n.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => n.attributes.push((name.to_string(), value.to_string())),
        }
    }

    fn attributes(&self, node: NodeHandle) -> Vec<(String, String)> {
        self.nodes
            .borrow()
            .get(node.0)
            .map(|n| n.attributes.clone())
            .unwrap_or_default()
    }

    fn is_visible(&self, node: NodeHandle) -> bool {
        if !self.is_attached(node) {
            return false;
        }
        let nodes = self.nodes.borrow();
        let mut current = Some(node);
        while let Some(n) = current {
            if nodes[n.0].hidden {
                return false;
            }
            current = nodes[n.0].parent;
        }
        true
    }
}
