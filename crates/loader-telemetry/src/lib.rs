//! # Loader Telemetry
//!
//! Installs a `tracing` subscriber for hosts embedding the component loader.
//! The loader itself only emits events; nothing is printed until a host
//! calls [`init_logging`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use loader_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config).expect("Failed to init logging");
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CL_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `CL_JSON_LOGS` | `false` | JSON formatted output |
//! | `CL_CONSOLE_OUTPUT` | `true` | Write events to stdout |
//! | `CL_SERVICE_NAME` | `component-loader` | Name attached to the startup event |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, init_test_logging, LoggingState};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },
}
