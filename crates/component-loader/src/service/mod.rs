//! Service Layer
//!
//! The loader itself and the weak mediator handle given to components.

pub mod loader;
pub mod mediator;

pub use loader::ComponentLoader;
pub use mediator::Mediator;
