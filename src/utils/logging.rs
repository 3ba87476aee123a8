//! Logging setup for the `hwstage` tool
//!
//! The library only emits `debug`/`trace` events; binaries decide how they are
//! rendered by calling one of the initializers here once at startup.
//!
//! ```rust,no_run
//! use hwstage::utils::init_logging;
//!
//! init_logging(None); // RUST_LOG, or "info"
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Filter used when neither RUST_LOG nor a configured filter is present
pub const DEFAULT_FILTER: &str = "info";

/// Pick the effective filter directive.
///
/// RUST_LOG wins over `configured`, which wins over [`DEFAULT_FILTER`].
pub fn effective_filter(configured: Option<&str>) -> String {
    match std::env::var("RUST_LOG") {
        Ok(env) if !env.trim().is_empty() => env,
        _ => configured.unwrap_or(DEFAULT_FILTER).to_string(),
    }
}

fn env_filter(configured: Option<&str>) -> EnvFilter {
    EnvFilter::try_new(effective_filter(configured)).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize human-readable logging on stderr
///
/// # Arguments
/// * `filter` - Optional filter from config (e.g. "debug", "hwstage::build=trace").
///              RUST_LOG still takes precedence.
pub fn init_logging(filter: Option<&str>) {
    // NO_COLOR disables ANSI colors
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(std::env::var("NO_COLOR").is_err()),
        )
        .with(env_filter(filter))
        .init();
}

/// Initialize logging with JSON output, one object per line
#[cfg(feature = "json-logging")]
pub fn init_json_logging(filter: Option<&str>) {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(true)
                .with_span_list(true),
        )
        .with(env_filter(filter))
        .init();
}

/// Initialize logging from the project's `[logging]` table
///
/// `json_format` falls back to plain output when the `json-logging` feature
/// is off.
pub fn init_logging_from_config(config: Option<&LoggingConfig>) {
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
