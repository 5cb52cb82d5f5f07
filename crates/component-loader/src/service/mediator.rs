//! Mediator handle
//!
//! Components hold a `Mediator` instead of the loader itself. It points back
//! through a weak reference, so instances stored in the loader never keep the
//! loader alive. Once the loader is gone every call is a logged no-op.

use serde_json::Value;
use shared_bus::Callback;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::warn;

use crate::domain::{ComponentData, Deferred, ScanReport, DEFAULT_DEFER};
use crate::error::LoaderError;
use crate::ports::{MediatorApi, Subscriber};
use crate::service::loader::LoaderCore;
use crate::service::ComponentLoader;

/// Weak handle to the loader's bus, scanner and scheduler.
#[derive(Clone)]
pub struct Mediator {
    core: Weak<LoaderCore>,
}

impl Mediator {
    pub(crate) fn new(core: Weak<LoaderCore>) -> Self {
        Self { core }
    }

    fn upgrade(&self, operation: &'static str) -> Option<Rc<LoaderCore>> {
        let core = self.core.upgrade();
        if core.is_none() {
            warn!(operation, "Loader dropped, mediator call ignored");
        }
        core
    }

    /// Whether the loader behind this handle still exists.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.core.strong_count() > 0
    }

    /// Strong handle to the loader, if it still exists.
    #[must_use]
    pub fn loader(&self) -> Option<ComponentLoader> {
        self.core.upgrade().map(ComponentLoader::from_core)
    }

    /// Delay used by `ComponentBase::defer`.
    #[must_use]
    pub fn default_defer(&self) -> Duration {
        self.core
            .upgrade()
            .map_or(DEFAULT_DEFER, |core| core.config().default_defer)
    }

    /// Listeners currently on `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.core
            .upgrade()
            .map_or(0, |core| core.topics().subscriber_count(topic))
    }
}

impl MediatorApi for Mediator {
    fn publish(&self, topic: &str, payload: &[Value]) -> bool {
        self.upgrade("publish")
            .is_some_and(|core| core.publish(topic, payload))
    }

    fn subscribe(&self, topic: &str, callback: Callback<Subscriber>, subscriber: Subscriber) {
        if let Some(core) = self.upgrade("subscribe") {
            core.topics().subscribe(topic, callback, subscriber);
        }
    }

    fn unsubscribe(&self, topic: &str, callback: &Callback<Subscriber>) -> bool {
        self.upgrade("unsubscribe")
            .is_some_and(|core| core.topics().unsubscribe(topic, callback))
    }

    fn scan(&self, data: Option<ComponentData>) -> Result<ScanReport, LoaderError> {
        let core = self.upgrade("scan").ok_or(LoaderError::LoaderDropped)?;
        core.scan(data)
    }

    fn defer(&self, delay: Duration, callback: Deferred) {
        if let Some(core) = self.upgrade("defer") {
            core.defer(delay, callback);
        }
    }
}

impl fmt::Debug for Mediator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mediator")
            .field("attached", &self.is_attached())
            .finish()
    }
}
