//! Cross-crate scenarios.

pub mod invocation;
pub mod mediator;
pub mod rendering;
