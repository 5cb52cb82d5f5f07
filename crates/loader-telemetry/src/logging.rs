//! Subscriber installation.
//!
//! The filter comes from `RUST_LOG` when it parses, otherwise from the
//! configured level. Output is plain text for development or JSON with
//! source locations for log shippers.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Outcome of [`init_logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingState {
    /// Our subscriber is now the global default.
    Installed,
    /// Another subscriber was already installed and is left in place.
    AlreadyInstalled,
    /// Console output is disabled; nothing was installed.
    Disabled,
}

/// Install the global subscriber described by `config`.
///
/// Calling this more than once, or after a host installed its own
/// subscriber, is not an error.
pub fn init_logging(config: &TelemetryConfig) -> Result<LoggingState, TelemetryError> {
    if !config.console_output {
        return Ok(LoggingState::Disabled);
    }

    let env_filter = build_filter(&config.log_level)?;

    let installed = if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    };

    if installed.is_err() {
        return Ok(LoggingState::AlreadyInstalled);
    }

    tracing::info!(
        service = %config.service_name,
        level = %config.log_level,
        json = config.json_logs,
        "Logging initialized"
    );
    Ok(LoggingState::Installed)
}

/// Subscriber for test binaries: writes through the test harness capture.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

fn build_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| TelemetryError::InvalidFilter {
            filter: level.to_string(),
            reason: e.to_string(),
        })
}
