//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - the mediator surface components and hosts call
//! - Driven Ports (outbound) - the node tree the loader scans

pub mod inbound;
pub mod outbound;

pub use inbound::{MediatorApi, Subscriber};
pub use outbound::NodeTree;
