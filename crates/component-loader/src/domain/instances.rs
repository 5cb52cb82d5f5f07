//! Live instance table
//!
//! Every key present maps to a handler that was constructed and not yet
//! destroyed. The liveness count is the table length, so it can never drift
//! from the contents or go negative.

use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::warn;

use crate::component::{Component, Hooks};
use crate::domain::identity::{InstanceKey, NodeHandle, NodeId};

/// Callback fired when a busy handler with a pending destroy is released.
pub(crate) type ReleaseHook = Rc<dyn Fn(&InstanceKey)>;

/// Shared handle to one live handler.
///
/// Cheap to clone. The handler sits behind a `RefCell`; a hook that re-enters
/// its own instance is refused instead of panicking. A destroy requested
/// while the handler is borrowed is parked on the handle and completed by
/// the release hook once the last borrow ends.
#[derive(Clone)]
pub struct InstanceHandle {
    key: InstanceKey,
    node: NodeHandle,
    hooks: Hooks,
    component: Rc<RefCell<Box<dyn Component>>>,
    destroy_pending: Rc<Cell<bool>>,
    on_release: Option<ReleaseHook>,
}

impl InstanceHandle {
    pub(crate) fn new(key: InstanceKey, node: NodeHandle, component: Box<dyn Component>) -> Self {
        let hooks = component.hooks();
        Self {
            key,
            node,
            hooks,
            component: Rc::new(RefCell::new(component)),
            destroy_pending: Rc::new(Cell::new(false)),
            on_release: None,
        }
    }

    pub(crate) fn with_release_hook(mut self, hook: impl Fn(&InstanceKey) + 'static) -> Self {
        self.on_release = Some(Rc::new(hook));
        self
    }

    #[must_use]
    pub fn key(&self) -> &InstanceKey {
        &self.key
    }

    #[must_use]
    pub fn node(&self) -> NodeHandle {
        self.node
    }

    #[must_use]
    pub fn node_id(&self) -> &NodeId {
        self.key.node_id()
    }

    /// Hooks declared by the handler at construction.
    #[must_use]
    pub fn hooks(&self) -> Hooks {
        self.hooks
    }

    /// Borrow the handler as its concrete type.
    ///
    /// `None` if `C` is not the handler's type or the handler is busy.
    pub fn with<C: Component, R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
        let result = {
            let guard = self.component.try_borrow().ok()?;
            let component: &dyn Component = &**guard;
            let result = component.as_any().downcast_ref::<C>().map(f);
            result
        };
        self.release();
        result
    }

    /// Mutably borrow the handler as its concrete type.
    pub fn with_mut<C: Component, R>(&self, f: impl FnOnce(&mut C) -> R) -> Option<R> {
        let result = {
            let mut guard = self.component.try_borrow_mut().ok()?;
            let component: &mut dyn Component = &mut **guard;
            let result = component.as_any_mut().downcast_mut::<C>().map(f);
            result
        };
        self.release();
        result
    }

    /// Whether the handler is a `C`.
    #[must_use]
    pub fn is<C: Component>(&self) -> bool {
        self.with(|_: &C| ()).is_some()
    }

    /// Forward a named call into the handler.
    pub fn call(&self, method: &str, args: &[Value]) -> Option<Value> {
        let mut result = None;
        self.run(|component| result = component.call(method, args));
        result
    }

    /// Run `f` against the handler; `false` if it is already borrowed.
    pub(crate) fn run(&self, f: impl FnOnce(&mut dyn Component)) -> bool {
        match self.component.try_borrow_mut() {
            Ok(mut guard) => f(&mut **guard),
            Err(_) => {
                warn!(key = %self.key, "Instance busy, re-entrant hook call refused");
                return false;
            }
        }
        self.release();
        true
    }

    /// Whether a hook or accessor currently holds the handler.
    pub(crate) fn is_busy(&self) -> bool {
        self.component.try_borrow_mut().is_err()
    }

    pub(crate) fn mark_destroy_pending(&self) {
        self.destroy_pending.set(true);
    }

    /// Clear the pending-destroy flag, returning whether it was set.
    pub(crate) fn take_destroy_pending(&self) -> bool {
        self.destroy_pending.replace(false)
    }

    #[must_use]
    pub fn is_destroy_pending(&self) -> bool {
        self.destroy_pending.get()
    }

    fn release(&self) {
        if !self.destroy_pending.get() || self.is_busy() {
            return;
        }
        if let Some(hook) = &self.on_release {
            hook(&self.key);
        }
    }
}

impl fmt::Debug for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceHandle")
            .field("key", &self.key)
            .field("node", &self.node)
            .field("hooks", &self.hooks)
            .field("destroy_pending", &self.destroy_pending.get())
            .finish_non_exhaustive()
    }
}

/// What one scan changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Keys that went absent → live, in construction order.
    pub created: Vec<InstanceKey>,
    /// Keys that went live → absent, in destruction order.
    pub destroyed: Vec<InstanceKey>,
}

impl ScanReport {
    /// Nothing was constructed or destroyed.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.created.is_empty() && self.destroyed.is_empty()
    }
}

/// Key → live handler, iterated in construction order.
#[derive(Debug, Default)]
pub struct LiveInstanceTable {
    instances: HashMap<InstanceKey, InstanceHandle>,
    order: Vec<InstanceKey>,
}

impl LiveInstanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler. An existing entry under the same key is kept and
    /// `false` is returned.
    pub fn insert(&mut self, handle: InstanceHandle) -> bool {
        if self.instances.contains_key(handle.key()) {
            return false;
        }
        self.order.push(handle.key().clone());
        self.instances.insert(handle.key().clone(), handle);
        true
    }

    pub fn remove(&mut self, key: &str) -> Option<InstanceHandle> {
        let handle = self.instances.remove(key)?;
        self.order.retain(|k| k.as_str() != key);
        Some(handle)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&InstanceHandle> {
        self.instances.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.instances.contains_key(key)
    }

    /// Keys in construction order.
    #[must_use]
    pub fn keys(&self) -> Vec<InstanceKey> {
        self.order.clone()
    }

    /// Handlers bound to the node carrying `node_id`.
    #[must_use]
    pub fn by_node(&self, node_id: &NodeId) -> Vec<InstanceHandle> {
        self.order
            .iter()
            .filter(|key| key.node_id() == node_id)
            .filter_map(|key| self.instances.get(key).cloned())
            .collect()
    }

    /// Liveness count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
