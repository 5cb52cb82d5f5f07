//! Node identities and composite instance keys
//!
//! A node gets a [`NodeId`] the first time a scan sees it carrying a marker.
//! The identity is written onto the node itself, so later scans recognise
//! the same node without the loader keeping a node → id map.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::warn;
use uuid::Uuid;

/// Opaque handle to a node of a [`NodeTree`](crate::ports::NodeTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeHandle(pub usize);

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity token stored on a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an existing token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Random RFC 4122 version 4 token.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `componentName-nodeId`, identifying one live handler instance.
///
/// Equality and hashing use the composite string only, so a table keyed by
/// `InstanceKey` can be queried with a plain `&str`.
#[derive(Debug, Clone)]
pub struct InstanceKey {
    component: String,
    node_id: NodeId,
    composite: String,
}

impl InstanceKey {
    pub fn new(component: &str, node_id: &NodeId) -> Self {
        Self {
            component: component.to_string(),
            node_id: node_id.clone(),
            composite: format!("{component}-{node_id}"),
        }
    }

    #[must_use]
    pub fn component(&self) -> &str {
        &self.component
    }

    #[must_use]
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.composite
    }
}

impl PartialEq for InstanceKey {
    fn eq(&self, other: &Self) -> bool {
        self.composite == other.composite
    }
}

impl Eq for InstanceKey {}

impl Hash for InstanceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.composite.hash(state);
    }
}

impl Borrow<str> for InstanceKey {
    fn borrow(&self) -> &str {
        &self.composite
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.composite)
    }
}

/// Outcome of resolving the identity of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub id: NodeId,
    /// The node had no usable identity and `id` must be written back.
    pub assigned: bool,
}

/// Issues node identities and remembers which node each one belongs to.
///
/// Every token ever issued stays reserved, so a regenerated token can never
/// collide with one handed out earlier. A token found on a node other than
/// the one it was bound to (a cloned or re-created node) is stale and gets
/// replaced; otherwise the new node would silently inherit the old node's
/// live instances.
pub struct IdentityIssuer {
    /// Token → node it was bound to.
    issued: HashMap<NodeId, NodeHandle>,

    /// Token source.
    generator: Box<dyn FnMut() -> NodeId>,

    /// Tokens discarded because they were already issued.
    collisions: u64,
}

impl IdentityIssuer {
    /// Issuer backed by random UUIDs.
    #[must_use]
    pub fn new() -> Self {
        Self::with_generator(NodeId::random)
    }

    /// Issuer backed by a custom token source.
    pub fn with_generator(generator: impl FnMut() -> NodeId + 'static) -> Self {
        Self {
            issued: HashMap::new(),
            generator: Box::new(generator),
            collisions: 0,
        }
    }

    /// Resolve the identity of `node`, given the token currently stored on it.
    pub fn resolve(&mut self, node: NodeHandle, stored: Option<&str>) -> ResolvedIdentity {
        if let Some(token) = stored.filter(|token| !token.is_empty()) {
            let id = NodeId::new(token);
            match self.issued.get(&id) {
                Some(bound) if *bound == node => {
                    return ResolvedIdentity { id, assigned: false };
                }
                Some(bound) => {
                    warn!(
                        node = %node,
                        bound_to = %bound,
                        id = %id,
                        "Stale node identity, assigning a fresh one"
                    );
                }
                None => {
                    // Token written by someone else: adopt it for this node.
                    self.issued.insert(id.clone(), node);
                    return ResolvedIdentity { id, assigned: false };
                }
            }
        }

        ResolvedIdentity {
            id: self.issue(node),
            assigned: true,
        }
    }

    /// Generate a token never issued before and bind it to `node`.
    pub fn issue(&mut self, node: NodeHandle) -> NodeId {
        let id = loop {
            let candidate = (self.generator)();
            if !self.issued.contains_key(&candidate) {
                break candidate;
            }
            self.collisions += 1;
        };
        self.issued.insert(id.clone(), node);
        id
    }

    /// Node a token is bound to, if it was ever issued or adopted.
    #[must_use]
    pub fn bound_node(&self, id: &NodeId) -> Option<NodeHandle> {
        self.issued.get(id).copied()
    }

    #[must_use]
    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }

    #[must_use]
    pub fn collisions(&self) -> u64 {
        self.collisions
    }
}

impl Default for IdentityIssuer {
    fn default() -> Self {
        Self::new()
    }
}
