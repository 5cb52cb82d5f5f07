//! Error types for the component loader

use crate::domain::InstanceKey;
use thiserror::Error;

/// Errors that can occur while managing components
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoaderError {
    /// A node declares a component name nothing was registered under.
    ///
    /// Fatal to the enclosing scan: markup and registrations disagree.
    #[error("unknown component '{name}' declared on node {node_id}")]
    UnknownComponent { name: String, node_id: String },

    /// Strict registration found a name that is already taken.
    #[error("there is already a registered component named '{name}'")]
    DuplicateComponent { name: String },

    #[error("invalid loader configuration: {0}")]
    InvalidConfig(String),

    #[error("no live instance for '{0}'")]
    InstanceNotFound(String),

    #[error("method '{method}' not supported by instance {key}")]
    UnsupportedMethod { key: InstanceKey, method: String },

    #[error("invalid method path: {0}")]
    InvalidMethodPath(String),

    /// The loader behind a mediator handle no longer exists.
    #[error("component loader has been dropped")]
    LoaderDropped,
}

impl LoaderError {
    /// Whether this is the lookup failure raised by scan.
    #[must_use]
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::UnknownComponent { .. })
    }

    /// Whether this is a strict-registration rejection.
    #[must_use]
    pub fn is_registration(&self) -> bool {
        matches!(self, Self::DuplicateComponent { .. })
    }
}
