//! Logging initialization for hosts and the scan tool
//!
//! - Respects RUST_LOG environment variable
//! - Allows configuration via config file
//! - Optional JSON output behind the `json-logging` feature
//!
//! # Usage
//! ```rust,no_run
//! use plugin_discovery::utils::init_logging;
//!
//! init_logging(None); // Uses RUST_LOG or defaults to "info"
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when neither RUST_LOG nor a config filter is set
pub const DEFAULT_FILTER: &str = "info";

/// Resolve the effective filter: RUST_LOG, then `filter`, then "info"
fn resolve_filter(filter: Option<&str>) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }
    EnvFilter::new(filter.unwrap_or(DEFAULT_FILTER))
}

/// Initialize human-readable logging to stderr
///
/// # Arguments
/// * `filter` - Optional log filter from config (e.g. "debug",
///   "plugin_discovery::discovery=trace"). RUST_LOG takes precedence.
///
/// Calling this more than once is a no-op after the first subscriber wins.
pub fn init_logging(filter: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(std::env::var("NO_COLOR").is_err()),
        )
        .with(resolve_filter(filter))
        .try_init();
}

/// Initialize logging with JSON output
///
/// Useful when logs need to be parsed by log aggregation systems.
#[cfg(feature = "json-logging")]
pub fn init_json_logging(filter: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(true)
                .with_span_list(true),
        )
        .with(resolve_filter(filter))
        .try_init();
}

/// Initialize logging from a `LoggingConfig`
///
/// Falls back to plain output when JSON is requested but the
/// `json-logging` feature is disabled.
pub fn init_logging_from_config(config: Option<&crate::config::LoggingConfig>) {
    let filter = config.and_then(|c| c.filter.as_deref());

    if config.map(|c| c.json_format).unwrap_or(false) {
        #[cfg(feature = "json-logging")]
        {
            init_json_logging(filter);
        }
        #[cfg(not(feature = "json-logging"))]
        {
            init_logging(filter);
        }
    } else {
        init_logging(filter);
    }
}
