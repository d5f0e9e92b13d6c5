//! Shared application state for the HTTP and channel handlers.

use std::sync::Arc;
use std::time::SystemTime;

use tracing::info;

use crate::broadcast::BroadcastEngine;
use crate::config::Config;
use crate::db::{create_pool, repository::Repository};
use crate::directory::{MemoryDirectory, SharedDirectory};
use crate::error::RelayResult;
use crate::registry::ConnectionRegistry;
use crate::session::HandshakePolicy;

/// Shared application state for API handlers.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast engine over the directory and connection registry.
    pub engine: BroadcastEngine,
    /// Treatment of handshakes that name no identity.
    pub handshake_policy: HandshakePolicy,
    /// Application start time for uptime tracking.
    pub start_time: SystemTime,
}

impl AppState {
    /// Create state over a directory with an empty connection registry.
    #[must_use]
    pub fn new(directory: SharedDirectory, handshake_policy: HandshakePolicy) -> Self {
        Self {
            engine: BroadcastEngine::new(directory, ConnectionRegistry::new()),
            handshake_policy,
            start_time: SystemTime::now(),
        }
    }

    /// Create state with the directory selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns a directory error if the SQLite store cannot be opened,
    /// migrated or seeded.
    pub async fn from_config(config: &Config) -> RelayResult<Self> {
        let directory = open_directory(config).await?;
        Ok(Self::new(directory, config.handshake_policy()))
    }
}

/// Open the booking directory selected by `config`.
///
/// A `DATABASE_URL` selects SQLite; otherwise the in-memory directory is used.
///
/// # Errors
///
/// Returns a directory error if the SQLite store cannot be opened, migrated
/// or seeded.
pub async fn open_directory(config: &Config) -> RelayResult<SharedDirectory> {
    if let Some(url) = config.database_url() {
        info!(url, "Using SQLite booking directory");
        let repository = Repository::new(create_pool(url).await?);
        if config.seed_demo_data() {
            repository.seed_demo_data().await?;
        }
        return Ok(Arc::new(repository));
    }

    info!(seeded = config.seed_demo_data(), "Using in-memory booking directory");
    let directory = if config.seed_demo_data() {
        MemoryDirectory::with_demo_data().await
    } else {
        MemoryDirectory::new()
    };
    Ok(Arc::new(directory))
}
