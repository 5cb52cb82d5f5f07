//! Loader configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use component_loader::domain::LoaderConfigBuilder;
//!
//! let config = LoaderConfigBuilder::new()
//!     .marker_attribute("data-widget")
//!     .id_attribute("data-widget-id")
//!     .build()
//!     .expect("Valid config");
//! ```

use crate::domain::scheduler::DEFAULT_DEFER;
use crate::error::LoaderError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the loader reads and writes the node tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Attribute listing component names, whitespace separated
    pub marker_attribute: String,
    /// Attribute the node identity is written to
    pub id_attribute: String,
    /// Prefix of attributes turned into constructor data
    pub data_prefix: String,
    /// Whether node data-attributes take part in constructor data
    pub merge_node_data: bool,
    /// Delay used by `defer` when none is given
    pub default_defer: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            marker_attribute: "data-component".to_string(),
            id_attribute: "data-component-id".to_string(),
            data_prefix: "data-".to_string(),
            merge_node_data: true,
            default_defer: DEFAULT_DEFER,
        }
    }
}

impl LoaderConfig {
    /// Validate attribute naming.
    pub fn validate(&self) -> Result<(), LoaderError> {
        if self.marker_attribute.trim().is_empty() {
            return Err(LoaderError::InvalidConfig(
                "marker_attribute cannot be empty".to_string(),
            ));
        }

        if self.id_attribute.trim().is_empty() {
            return Err(LoaderError::InvalidConfig(
                "id_attribute cannot be empty".to_string(),
            ));
        }

        // The loader would overwrite its own marker list with an identity.
        if self.marker_attribute == self.id_attribute {
            return Err(LoaderError::InvalidConfig(format!(
                "marker_attribute and id_attribute are both '{}'",
                self.marker_attribute
            )));
        }

        if self.merge_node_data && self.data_prefix.is_empty() {
            return Err(LoaderError::InvalidConfig(
                "data_prefix cannot be empty while merge_node_data is on".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder-style method to set the marker attribute
    pub fn with_marker_attribute(mut self, name: impl Into<String>) -> Self {
        self.marker_attribute = name.into();
        self
    }

    /// Builder-style method to toggle node data merging
    pub fn with_node_data(mut self, enabled: bool) -> Self {
        self.merge_node_data = enabled;
        self
    }
}

/// Builder for LoaderConfig with validation
#[derive(Default)]
pub struct LoaderConfigBuilder {
    marker_attribute: Option<String>,
    id_attribute: Option<String>,
    data_prefix: Option<String>,
    merge_node_data: Option<bool>,
    default_defer: Option<Duration>,
}

impl LoaderConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker_attribute(mut self, name: impl Into<String>) -> Self {
        self.marker_attribute = Some(name.into());
        self
    }

    pub fn id_attribute(mut self, name: impl Into<String>) -> Self {
        self.id_attribute = Some(name.into());
        self
    }

    pub fn data_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.data_prefix = Some(prefix.into());
        self
    }

    pub fn merge_node_data(mut self, enabled: bool) -> Self {
        self.merge_node_data = Some(enabled);
        self
    }

    pub fn default_defer(mut self, delay: Duration) -> Self {
        self.default_defer = Some(delay);
        self
    }

    /// Build the LoaderConfig, validating all fields
    pub fn build(self) -> Result<LoaderConfig, LoaderError> {
        let defaults = LoaderConfig::default();

        let config = LoaderConfig {
            marker_attribute: self.marker_attribute.unwrap_or(defaults.marker_attribute),
            id_attribute: self.id_attribute.unwrap_or(defaults.id_attribute),
            data_prefix: self.data_prefix.unwrap_or(defaults.data_prefix),
            merge_node_data: self.merge_node_data.unwrap_or(defaults.merge_node_data),
            default_defer: self.default_defer.unwrap_or(defaults.default_defer),
        };

        config.validate()?;
        Ok(config)
    }
}
