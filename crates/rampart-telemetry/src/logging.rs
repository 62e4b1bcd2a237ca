//! Structured logging to stderr.
//!
//! Stdout is left to command output (route tables, validation reports), so
//! every layer writes to stderr.

use crate::{LogFormat, TelemetryConfig, TelemetryError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the logging subsystem.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match config.log_format {
        LogFormat::Json => init_json_logging(filter),
        LogFormat::Pretty => init_pretty_logging(filter),
    }
}

fn init_json_logging(filter: EnvFilter) -> Result<(), TelemetryError> {
    let json_layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_current_span(false)
        .with_span_list(false)
        .flatten_event(true)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(json_layer)
        .try_init()
        .map_err(|e: tracing_subscriber::util::TryInitError| {
            TelemetryError::LoggingInit(e.to_string())
        })
}

fn init_pretty_logging(filter: EnvFilter) -> Result<(), TelemetryError> {
    let pretty_layer = fmt::layer()
        .pretty()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(pretty_layer)
        .try_init()
        .map_err(|e: tracing_subscriber::util::TryInitError| {
            TelemetryError::LoggingInit(e.to_string())
        })
}

/// Standard log event names.
pub mod events {
    /// A compiler command is starting.
    pub const STARTUP: &str = "startup";

    /// Schema catalogs have been loaded into the registry.
    pub const SCHEMAS_LOADED: &str = "schemas_loaded";

    /// Override rules have been loaded.
    pub const RULES_LOADED: &str = "rules_loaded";

    /// Compilation finished successfully.
    pub const COMPILE_FINISHED: &str = "compile_finished";

    /// Compilation aborted with an error.
    pub const COMPILE_FAILED: &str = "compile_failed";

    /// A non-fatal compilation warning.
    pub const COMPILE_WARNING: &str = "compile_warning";

    /// The route table has been written.
    pub const ROUTES_WRITTEN: &str = "routes_written";
}

/// Helper macros for structured logging with standard fields.
///
/// These wrap the tracing macros to ensure consistent field naming.
#[macro_export]
macro_rules! log_startup {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::STARTUP,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_schemas_loaded {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::SCHEMAS_LOADED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_rules_loaded {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::RULES_LOADED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_compile_finished {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::COMPILE_FINISHED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_compile_failed {
    ($($field:tt)*) => {
        tracing::error!(
            event = $crate::logging::events::COMPILE_FAILED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_compile_warning {
    ($($field:tt)*) => {
        tracing::warn!(
            event = $crate::logging::events::COMPILE_WARNING,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_routes_written {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::ROUTES_WRITTEN,
            $($field)*
        )
    };
}
