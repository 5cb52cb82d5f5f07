//! Handler base contract
//!
//! Every registered constructor receives the same [`ComponentArgs`]: the
//! node it is bound to, its constructor data and a mediator handle back to
//! the loader. What a handler does with them is its own business; the loader
//! only ever drives the optional hooks declared through [`Hooks`].
//!
//! Handlers that want the usual conveniences embed a [`ComponentBase`]:
//!
//! ```ignore
//! struct Header {
//!     base: ComponentBase,
//! }
//!
//! impl Component for Header {
//!     fn hooks(&self) -> Hooks {
//!         Hooks::INIT | Hooks::DESTROY
//!     }
//!
//!     fn init(&mut self) {
//!         self.base.publish("header-ready", &[]);
//!     }
//! }
//!
//! loader.register([("Header", ComponentFactory::new(|args| Header {
//!     base: ComponentBase::new(args),
//! }))]);
//! ```

use bitflags::bitflags;
use serde_json::Value;
use shared_bus::Callback;
use std::any::Any;
use std::time::Duration;

use crate::domain::{ComponentData, InstanceKey, NodeHandle, ScanReport};
use crate::error::LoaderError;
use crate::ports::{MediatorApi, Subscriber};
use crate::service::Mediator;

bitflags! {
    /// Optional lifecycle hooks a handler implements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Hooks: u8 {
        /// `init` runs right after construction.
        const INIT = 1;
        /// `render` runs after `init` when the node is visible, otherwise
        /// on the next `notify_all` that finds it visible.
        const RENDER = 1 << 1;
        /// `destroy` runs once when the node leaves the tree.
        const DESTROY = 1 << 2;
    }
}

/// Upcast helper so handles can hand out concrete types.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// An instantiated handler.
///
/// Hooks not listed in [`Component::hooks`] are never called.
pub trait Component: AsAny {
    fn hooks(&self) -> Hooks {
        Hooks::empty()
    }

    fn init(&mut self) {}

    fn render(&mut self) {}

    fn destroy(&mut self) {}

    /// Entry point for callers that only know the instance key and a method
    /// name. `None` means the method is not supported.
    fn call(&mut self, _method: &str, _args: &[Value]) -> Option<Value> {
        None
    }
}

/// Fixed construction arguments.
#[derive(Debug, Clone)]
pub struct ComponentArgs {
    /// Node the instance is bound to
    pub node: NodeHandle,
    /// Merged constructor data
    pub data: ComponentData,
    /// Key the instance will be stored under
    pub key: InstanceKey,
    /// Handle back to the loader
    pub mediator: Mediator,
}

/// Reusable base for handlers.
///
/// Holds the construction arguments and forwards publish/subscribe/scan to
/// the mediator captured at construction. It keeps no state of its own.
#[derive(Debug, Clone)]
pub struct ComponentBase {
    node: NodeHandle,
    data: ComponentData,
    key: InstanceKey,
    mediator: Mediator,
}

impl ComponentBase {
    pub fn new(args: ComponentArgs) -> Self {
        Self {
            node: args.node,
            data: args.data,
            key: args.key,
            mediator: args.mediator,
        }
    }

    #[must_use]
    pub fn node(&self) -> NodeHandle {
        self.node
    }

    #[must_use]
    pub fn data(&self) -> &ComponentData {
        &self.data
    }

    #[must_use]
    pub fn key(&self) -> &InstanceKey {
        &self.key
    }

    #[must_use]
    pub fn mediator(&self) -> &Mediator {
        &self.mediator
    }

    /// Publish an event for other components.
    pub fn publish(&self, topic: &str, payload: &[Value]) -> bool {
        self.mediator.publish(topic, payload)
    }

    /// Subscribe to an event; the listener is bound to this instance's key.
    pub fn subscribe(&self, topic: &str, callback: Callback<Subscriber>) {
        self.mediator
            .subscribe(topic, callback, Some(self.key.clone()));
    }

    pub fn unsubscribe(&self, topic: &str, callback: &Callback<Subscriber>) -> bool {
        self.mediator.unsubscribe(topic, callback)
    }

    /// Ask the loader to look for new components, e.g. after injecting markup.
    pub fn scan(&self, data: Option<ComponentData>) -> Result<ScanReport, LoaderError> {
        self.mediator.scan(data)
    }

    /// Defer `callback` by the loader's default delay.
    pub fn defer(&self, callback: impl FnOnce() + 'static) {
        let delay = self.mediator.default_defer();
        self.mediator.defer(delay, Box::new(callback));
    }

    pub fn defer_for(&self, delay: Duration, callback: impl FnOnce() + 'static) {
        self.mediator.defer(delay, Box::new(callback));
    }
}
