//! Outbound Ports (Driven Ports)
//!
//! The loader never walks or renders the tree itself; it asks the host
//! environment through [`NodeTree`].

use crate::domain::NodeHandle;

/// Hierarchical node tree the loader reconciles against.
///
/// Methods take `&self`: the tree is shared with the host, which keeps
/// mutating it between scans, so implementors use interior mutability.
/// Unknown handles behave like nodes without attributes.
pub trait NodeTree {
    /// Default scan context.
    fn root(&self) -> NodeHandle;

    /// Every descendant of `context` (not `context` itself) carrying
    /// `attribute`, in document order.
    fn query_marked(&self, context: NodeHandle, attribute: &str) -> Vec<NodeHandle>;

    fn attribute(&self, node: NodeHandle, name: &str) -> Option<String>;

    fn set_attribute(&self, node: NodeHandle, name: &str, value: &str);

    /// All attributes of `node`, in the order they were set.
    fn attributes(&self, node: NodeHandle) -> Vec<(String, String)>;

    /// Whether `node` is currently presented (attached and not hidden).
    fn is_visible(&self, node: NodeHandle) -> bool;
}
