//! # Quill Telemetry
//!
//! Structured logging for Quill components.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quill_telemetry::{TelemetryConfig, init_telemetry};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::for_component("console"))?;
//!     // Spans and events are now written to stderr
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `QUILL_SERVICE_NAME` | `quill` | Service name in logs |
//! | `QUILL_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `QUILL_JSON_LOGS` | `false` | JSON output (defaults on inside containers) |
//! | `QUILL_CONSOLE_OUTPUT` | `true` | Write logs at all |

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging for the process.
///
/// Returns a guard that should be held for the lifetime of the application;
/// dropping it logs the shutdown.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    tracing_setup::init_tracing(&config)?;

    Ok(TelemetryGuard {
        service: config.full_service_name(),
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::debug!(service = %self.service, "Shutting down telemetry");
    }
}

/// Log an engagement event with the component attached.
///
/// ```rust,ignore
/// log_event!(warn, "engagement", "Comment sync failed", article_id = %id);
/// ```
#[macro_export]
macro_rules! log_event {
    ($level:ident, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "quill");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_invalid_filter_is_reported_before_install() {
        let config = TelemetryConfig::default().with_log_level("quill=bogus");
        assert!(matches!(
            init_telemetry(config),
            Err(TelemetryError::Config(_))
        ));
    }
}
