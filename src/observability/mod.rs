//! Observability and structured logging infrastructure.
//!
//! Logging uses the tracing framework. Channel connects and disconnects are
//! logged at `info`, dropped frames at `debug`, and lost updates at `warn`.
//!
//! # Usage
//!
//! ```no_run
//! use location_relay::observability;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Keep the guard alive for as long as file logging should flush.
//! let _guard = observability::init_tracing(None, None, false)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Environment Configuration
//!
//! ```bash
//! # Component-specific levels
//! RUST_LOG=location_relay=debug,sqlx=warn location-relay serve
//!
//! # JSON console output for log aggregation
//! LOG_JSON=true location-relay serve
//!
//! # Additional JSON file output with daily rotation
//! LOG_FILE=./logs/relay.log location-relay serve
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Default filter: info for the relay, warn for dependencies.
pub const DEFAULT_FILTER: &str = "location_relay=info,warn";

/// Build the level filter from `RUST_LOG`, an explicit level, or the default.
#[must_use]
pub fn build_filter(log_level: Option<String>) -> EnvFilter {
    if let Ok(filter) = std::env::var("RUST_LOG") {
        EnvFilter::new(filter)
    } else if let Some(level) = log_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(DEFAULT_FILTER)
    }
}

/// Initialize the tracing subscriber.
///
/// # Arguments
///
/// * `log_level` - Optional level override used when `RUST_LOG` is unset.
/// * `log_file` - Optional file path; enables daily-rotated JSON file output.
/// * `json_output` - JSON console output instead of pretty-printed output.
///
/// Returns the file writer's guard when file output is enabled. Buffered
/// lines are flushed when the guard drops.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init_tracing(
    log_level: Option<String>,
    log_file: Option<PathBuf>,
    json_output: bool,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let env_filter = build_filter(log_level);

    let console_layer = if json_output {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(ref path) = log_file {
        let directory = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(directory)?;

        let file_appender = tracing_appender::rolling::daily(
            directory,
            path.file_name().unwrap_or_else(|| OsStr::new("relay.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let layer = fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    info!(
        json_output,
        file_logging = log_file.is_some(),
        "Tracing initialized"
    );

    Ok(guard)
}

/// Initialize tracing for tests; output goes to the test harness.
///
/// Safe to call from several tests; only the first call installs a
/// subscriber.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("location_relay=debug"))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let filter = EnvFilter::new(DEFAULT_FILTER);
        assert!(filter.to_string().contains("location_relay=info"));
    }

    #[test]
    fn test_test_tracing_is_idempotent() {
        init_test_tracing();
        init_test_tracing();
    }
}
