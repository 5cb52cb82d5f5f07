//! # Shared Bus - Mediator Topic Table
//!
//! Publish/subscribe channel that lets sibling components talk without
//! holding references to each other.
//!
//! ## Mediator Pattern
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Component A  │                    │ Component B  │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │ Topic Table  │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Semantics
//!
//! - Listeners fire in subscription order, bound to the identity given at
//!   subscribe time.
//! - `unsubscribe` removes the first entry holding the same callback `Rc`.
//! - Publishing to a topic nobody subscribed to is reported, never an error.
//! - Everything is synchronous and single-threaded; re-entrant publishes are
//!   served from a per-call snapshot.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use publisher::TopicTable;
pub use subscriber::{callback, callback_eq, Callback, Subscription};

/// Payload element type carried by every publish.
pub use serde_json::Value;
