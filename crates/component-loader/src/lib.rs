//! # Component Loader
//!
//! Attaches behaviour to nodes of a tree that declare it through a marker
//! attribute, and keeps the set of live instances in step with the tree.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure state, no tree access
//!   - `IdentityIssuer`: Node identities and stale-identity detection
//!   - `ComponentRegistry`: Name → constructor map
//!   - `LiveInstanceTable`: Key → live handler
//!   - `DeferredQueue`: Delayed callbacks
//!   - `LoaderConfig` / `LoaderConfigBuilder`: Attribute naming with validation
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `MediatorApi`: Driving port (publish/subscribe/scan/defer)
//!   - `NodeTree`: Driven port (the scanned tree)
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `ComponentLoader`: Scan, construct, destroy, render
//!   - `Mediator`: Weak handle given to every component
//!
//! - **Adapters Layer** (`adapters/`)
//!   - `MemoryTree`: In-memory element tree
//!
//! ## Invariants
//!
//! - A key is constructed at most once while it stays live.
//! - `destroy` runs exactly once per instance, before its entry is removed.
//! - The live count is the table length and never goes negative.
//!
//! ## Usage Example
//!
//! ```ignore
//! use component_loader::{ComponentFactory, ComponentLoader, MediatorApi, MemoryTree};
//! use std::rc::Rc;
//!
//! let (tree, _) = MemoryTree::from_markers(&["Header", "Header Tabs"]);
//! let loader = ComponentLoader::new(Rc::new(tree));
//! loader.register([
//!     ("Header", ComponentFactory::new(Header::new)),
//!     ("Tabs", ComponentFactory::new(Tabs::new)),
//! ]);
//!
//! let report = loader.scan(None)?;
//! assert_eq!(report.created.len(), 3);
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod component;
pub mod domain;
pub mod error;
pub mod invocation;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::MemoryTree;
pub use component::{Component, ComponentArgs, ComponentBase, Hooks};
pub use domain::{
    ComponentData, ComponentFactory, IdentityIssuer, InstanceHandle, InstanceKey, LoaderConfig,
    LoaderConfigBuilder, NodeHandle, NodeId, ScanReport, DEFAULT_DEFER,
};
pub use error::LoaderError;
pub use invocation::MethodPath;
pub use metrics::{LoaderMetrics, MetricsSnapshot};
pub use ports::{MediatorApi, NodeTree, Subscriber};
pub use service::{ComponentLoader, Mediator};
pub use shared_bus::{callback, callback_eq, Callback, Value};
