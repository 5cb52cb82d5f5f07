//! Inbound Ports (Driving Ports)
//!
//! The mediator surface. Both the loader itself and the weak handle given
//! to every component implement it, so hosts and components talk to the
//! loader through the same calls.

use serde_json::Value;
use shared_bus::Callback;
use std::time::Duration;

use crate::domain::{ComponentData, Deferred, InstanceKey, ScanReport};
use crate::error::LoaderError;

/// Identity a listener is bound to: the subscribing instance, or `None`
/// for host code.
pub type Subscriber = Option<InstanceKey>;

/// Publish/subscribe, re-scan and deferral.
pub trait MediatorApi {
    /// Fire every listener of `topic` in subscription order.
    ///
    /// `false` means nobody ever subscribed to `topic`; that is not an error.
    fn publish(&self, topic: &str, payload: &[Value]) -> bool;

    /// Append a listener bound to `subscriber`.
    fn subscribe(&self, topic: &str, callback: Callback<Subscriber>, subscriber: Subscriber);

    /// Remove the first listener on `topic` holding `callback`.
    fn unsubscribe(&self, topic: &str, callback: &Callback<Subscriber>) -> bool;

    /// Reconcile the tree against the live instance table.
    ///
    /// # Errors
    ///
    /// - `LoaderError::UnknownComponent` - a node declares an unregistered name
    /// - `LoaderError::LoaderDropped` - called through a handle that outlived its loader
    fn scan(&self, data: Option<ComponentData>) -> Result<ScanReport, LoaderError>;

    /// Run `callback` once `delay` has passed and the host pumps the queue.
    fn defer(&self, delay: Duration, callback: Deferred);
}
