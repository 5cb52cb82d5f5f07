//! Telemetry configuration from environment variables.

use std::env;

/// How the host wants loader events written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Name attached to the startup event
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or directives
    pub log_level: String,

    /// Whether to write events at all
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "component-loader".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CL_SERVICE_NAME`: Service name (default: component-loader)
    /// - `CL_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `CL_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `CL_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("CL_SERVICE_NAME")
                .unwrap_or_else(|_| "component-loader".to_string()),

            log_level: env::var("CL_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("CL_CONSOLE_OUTPUT")
                .map(|v| !is_false(&v))
                .unwrap_or(true),

            json_logs: env::var("CL_JSON_LOGS")
                .map(|v| is_true(&v))
                .unwrap_or(false),
        }
    }

    /// Builder-style method to set the level filter
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Builder-style method to toggle JSON output
    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }
}

fn is_true(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

fn is_false(value: &str) -> bool {
    value.eq_ignore_ascii_case("false") || value == "0"
}
