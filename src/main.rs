//! CLI entry point for the location relay.
//!
//! ```text
//! main.rs (runtime + tracing)
//!     ↓
//! cli.rs
//!     ├── serve  → config → directory → AppState → api::server
//!     ├── watch  → client::LocationTracker
//!     └── report → client::LocationUpdater
//! ```

use location_relay::{cli, observability};
use tracing::error;

/// Entry point for the location relay.
///
/// Tracing is configured from the environment:
/// - `RUST_LOG`: filter directives (default `location_relay=info,warn`)
/// - `LOG_JSON`: JSON console output ("true" or "false")
/// - `LOG_FILE`: additional JSON file output with daily rotation
#[tokio::main]
async fn main() {
    let log_level = std::env::var("RUST_LOG").ok();
    let log_file = std::env::var("LOG_FILE").ok().map(std::path::PathBuf::from);
    let json_output = std::env::var("LOG_JSON")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    let _log_guard = match observability::init_tracing(log_level, log_file, json_output) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize tracing: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = cli::run().await {
        error!(error = %e, "Application error");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
