//! # Topic Table
//!
//! Defines the publishing side of the mediator.
//!
//! The table is single-threaded and re-entrant: `publish` snapshots the
//! listener list of a topic before firing, so callbacks may subscribe,
//! unsubscribe or publish again without invalidating the traversal.

use crate::subscriber::{Callback, Subscription};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use tracing::debug;

/// Ordered topic → listener table.
pub struct TopicTable<S> {
    /// Listener lists keyed by topic, in subscribe order.
    topics: RefCell<HashMap<String, Vec<Subscription<S>>>>,

    /// Total publish calls that reached a known topic.
    events_published: Cell<u64>,
}

impl<S: Clone> TopicTable<S> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            topics: RefCell::new(HashMap::new()),
            events_published: Cell::new(0),
        }
    }

    /// Append a listener to `topic`.
    pub fn subscribe(&self, topic: &str, callback: Callback<S>, subscriber: S) {
        let mut topics = self.topics.borrow_mut();
        let listeners = topics.entry(topic.to_string()).or_default();
        listeners.push(Subscription::new(subscriber, callback));

        debug!(topic, listeners = listeners.len(), "Subscribed");
    }

    /// Remove the first listener on `topic` holding `callback`.
    ///
    /// Returns `false` when the topic or the callback is unknown.
    pub fn unsubscribe(&self, topic: &str, callback: &Callback<S>) -> bool {
        let mut topics = self.topics.borrow_mut();
        let Some(listeners) = topics.get_mut(topic) else {
            return false;
        };
        let Some(position) = listeners.iter().position(|sub| sub.matches(callback)) else {
            return false;
        };

        listeners.remove(position);
        debug!(topic, listeners = listeners.len(), "Unsubscribed");
        true
    }

    /// Fire every listener of `topic` in subscription order.
    ///
    /// Returns `false` if nobody ever subscribed to `topic`. A topic whose
    /// listeners have all unsubscribed is still known and returns `true`.
    pub fn publish(&self, topic: &str, payload: &[Value]) -> bool {
        let snapshot: Vec<Subscription<S>> = {
            let topics = self.topics.borrow();
            match topics.get(topic) {
                Some(listeners) => listeners.clone(),
                None => {
                    debug!(topic, "Publish dropped (no subscribers)");
                    return false;
                }
            }
        };

        self.events_published.set(self.events_published.get() + 1);
        debug!(topic, receivers = snapshot.len(), "Publishing");

        for subscription in &snapshot {
            subscription.fire(payload);
        }
        true
    }

    /// Number of listeners currently on `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.borrow().get(topic).map_or(0, Vec::len)
    }

    /// Number of topics that have ever been subscribed to.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.topics.borrow().len()
    }

    /// Total publishes delivered to a known topic.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.events_published.get()
    }
}

impl<S: Clone> Default for TopicTable<S> {
    fn default() -> Self {
        Self::new()
    }
}
