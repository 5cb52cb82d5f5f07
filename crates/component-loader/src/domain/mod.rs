//! Domain Layer
//!
//! Pure state for the loader: identities, registrations, live instances,
//! constructor data and deferred callbacks. No tree access, no hooks run
//! from here.

pub mod config;
pub mod data;
pub mod identity;
pub mod instances;
pub mod registry;
pub mod scheduler;

pub use config::{LoaderConfig, LoaderConfigBuilder};
pub use data::{attribute_data, kebab_to_camel, merge_layers, ComponentData};
pub use identity::{IdentityIssuer, InstanceKey, NodeHandle, NodeId, ResolvedIdentity};
pub use instances::{InstanceHandle, LiveInstanceTable, ScanReport};
pub use registry::{ComponentFactory, ComponentRegistry, Constructor};
pub use scheduler::{Deferred, DeferredQueue, DEFAULT_DEFER};
