//! Configuration management for the location relay.
//!
//! Configuration is read from environment variables, with a `.env` file
//! loaded through `dotenvy` when present. All operations return
//! [`RelayResult`].
//!
//! ## Environment Variables
//!
//! All optional (with defaults):
//! - `PORT`: HTTP/WebSocket listen port (default: 5000)
//! - `DATABASE_URL`: SQLite URL for the booking directory; when unset the
//!   in-memory directory is used
//! - `SEED_DEMO_DATA`: Seed the demo professionals and bookings (default: true)
//! - `RATE_LIMIT_RPM`: Requests per minute allowed by the API rate limiter
//!   (default: 600)
//! - `CORS_ORIGINS`: Comma-separated allowed origins, `*` or empty for any
//! - `UNIDENTIFIED_HANDSHAKE`: `refuse` or `inert` (default: refuse)
//! - `RUST_LOG`, `LOG_JSON`, `LOG_FILE`: read by the binary for tracing setup
//!
//! ## Example
//!
//! ```no_run
//! use location_relay::config::Config;
//! use location_relay::error::RelayResult;
//!
//! # fn main() -> RelayResult<()> {
//! let config = Config::from_env()?;
//! println!("Listening on port {}", config.port());
//! # Ok(())
//! # }
//! ```

use std::env;
use std::str::FromStr;

use crate::error::{RelayError, RelayResult};
use crate::session::HandshakePolicy;

/// Runtime configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen port
    port: u16,

    /// SQLite URL, `None` selects the in-memory directory
    database_url: Option<String>,

    /// Seed demo rows on startup
    seed_demo_data: bool,

    /// API requests allowed per minute
    rate_limit_rpm: u32,

    /// Allowed CORS origins, empty means any
    cors_origins: Vec<String>,

    /// Treatment of unidentified handshakes
    handshake_policy: HandshakePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            database_url: None,
            seed_demo_data: true,
            rate_limit_rpm: 600,
            cors_origins: Vec::new(),
            handshake_policy: HandshakePolicy::Refuse,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value that does not parse,
    /// or if `RATE_LIMIT_RPM` is zero.
    pub fn from_env() -> RelayResult<Self> {
        // Load .env file if present (ignore error if file doesn't exist)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> RelayResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = parse_or(&lookup, "PORT", defaults.port, "PORT must be a valid port number")?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let seed_demo_data = parse_or(
            &lookup,
            "SEED_DEMO_DATA",
            defaults.seed_demo_data,
            "SEED_DEMO_DATA must be 'true' or 'false'",
        )?;

        let rate_limit_rpm = parse_or(
            &lookup,
            "RATE_LIMIT_RPM",
            defaults.rate_limit_rpm,
            "RATE_LIMIT_RPM must be a valid number",
        )?;
        if rate_limit_rpm == 0 {
            return Err(RelayError::config(
                "RATE_LIMIT_RPM must be greater than zero",
                None,
            ));
        }

        // A wildcard anywhere in the list allows every origin.
        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let cors_origins = if cors_origins.iter().any(|origin| origin == "*") {
            Vec::new()
        } else {
            cors_origins
        };

        let handshake_policy = match lookup("UNIDENTIFIED_HANDSHAKE") {
            Some(raw) => raw
                .trim()
                .parse::<HandshakePolicy>()
                .map_err(|e| RelayError::config(format!("UNIDENTIFIED_HANDSHAKE: {e}"), None))?,
            None => defaults.handshake_policy,
        };

        Ok(Self {
            port,
            database_url,
            seed_demo_data,
            rate_limit_rpm,
            cors_origins,
            handshake_policy,
        })
    }

    /// Override the listen port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Get the listen port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Get the SQLite URL, if one is configured.
    #[must_use]
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    /// Check if demo data should be seeded.
    #[must_use]
    pub const fn seed_demo_data(&self) -> bool {
        self.seed_demo_data
    }

    /// Get the API rate limit in requests per minute.
    #[must_use]
    pub const fn rate_limit_rpm(&self) -> u32 {
        self.rate_limit_rpm
    }

    /// Get the allowed CORS origins. Empty means any origin.
    #[must_use]
    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    /// Get the unidentified-handshake policy.
    #[must_use]
    pub const fn handshake_policy(&self) -> HandshakePolicy {
        self.handshake_policy
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T, message: &str) -> RelayResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| RelayError::config(message, Some(Box::new(e)))),
        None => Ok(default),
    }
}
