//! # Subscriber
//!
//! Defines the subscription side of the topic table.

use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// Callback invoked for every publish on a subscribed topic.
///
/// Receives the subscriber identity stored at subscribe time and the payload
/// given to `publish`. Two callbacks are "the same" when they share one `Rc`
/// allocation, so keep a clone of the `Rc` to unsubscribe later.
pub type Callback<S> = Rc<dyn Fn(&S, &[Value])>;

/// Wrap a closure as a [`Callback`].
pub fn callback<S, F>(f: F) -> Callback<S>
where
    F: Fn(&S, &[Value]) + 'static,
{
    Rc::new(f)
}

/// Compare two callbacks by allocation, ignoring vtable metadata.
#[must_use]
pub fn callback_eq<S>(a: &Callback<S>, b: &Callback<S>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// One listener entry in a topic list.
pub struct Subscription<S> {
    /// Identity the callback is bound to.
    subscriber: S,

    /// The listener itself.
    callback: Callback<S>,
}

impl<S> Subscription<S> {
    /// Create a new subscription entry.
    pub(crate) fn new(subscriber: S, callback: Callback<S>) -> Self {
        Self {
            subscriber,
            callback,
        }
    }

    /// Identity this subscription is bound to.
    #[must_use]
    pub fn subscriber(&self) -> &S {
        &self.subscriber
    }

    /// Whether this entry holds `callback`.
    #[must_use]
    pub fn matches(&self, callback: &Callback<S>) -> bool {
        callback_eq(&self.callback, callback)
    }

    /// Invoke the callback with this entry's subscriber identity.
    pub fn fire(&self, payload: &[Value]) {
        (self.callback)(&self.subscriber, payload);
    }
}

impl<S: Clone> Clone for Subscription<S> {
    fn clone(&self) -> Self {
        Self {
            subscriber: self.subscriber.clone(),
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Subscription<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("subscriber", &self.subscriber)
            .field("callback", &Rc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}
