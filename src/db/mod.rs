//! SQLite-backed booking directory.
//!
//! This module provides SQLite storage for the two marketplace tables the
//! relay reads:
//! - `service_professionals` (including the last reported coordinate)
//! - `bookings` (with their lifecycle status)
//!
//! # Architecture
//!
//! - `models`: Row structures that map to database tables
//! - `repository`: Queries, implementing [`crate::directory::BookingDirectory`]
//! - Connection pooling with SQLite WAL mode for concurrency
//! - Migration system for schema versioning

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    SqlitePool,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::RelayError;

pub mod models;
pub mod repository;

/// Creates a SQLite connection pool and brings the schema up to date.
///
/// # Configuration
///
/// - **WAL mode**: Enables concurrent readers during writes
/// - **Busy timeout**: 30 seconds to handle lock contention
/// - **Max connections**: 5
/// - **Min connections**: 1 (keep one connection warm)
///
/// # Example
///
/// ```no_run
/// use location_relay::db::create_pool;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool("sqlite:./relay.db").await?;
///     Ok(())
/// }
/// ```
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, RelayError> {
    info!(database_url, "Connecting to directory database");

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| {
            RelayError::directory(
                format!("Failed to parse database URL: {database_url}"),
                Some(Box::new(e)),
            )
        })?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(30));

    // An in-memory database exists per connection, so pin the pool to one.
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
        .map_err(|e| {
            RelayError::directory(
                format!("Failed to connect to database at {database_url}"),
                Some(Box::new(e)),
            )
        })?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .map_err(|e| {
            RelayError::directory("Failed to enable foreign keys", Some(Box::new(e)))
        })?;

    info!("Running database migrations");
    run_migrations(&pool).await?;
    verify_database(&pool).await?;
    info!("Database migrations complete");

    Ok(pool)
}

/// Runs database migrations from the `migrations/` directory.
///
/// Migrations are applied in order and are idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), RelayError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| {
            RelayError::directory("Failed to run database migrations", Some(Box::new(e)))
        })?;

    Ok(())
}

/// Verify that required tables exist after migrations.
pub async fn verify_database(pool: &SqlitePool) -> Result<(), RelayError> {
    let rows = sqlx::query_as::<_, (String,)>(
        r#"
        SELECT name FROM sqlite_master
        WHERE type='table' AND name IN ('service_professionals', 'bookings')
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| RelayError::directory("Failed to verify database schema", Some(Box::new(e))))?;

    if rows.len() < 2 {
        return Err(RelayError::directory(
            format!(
                "Database schema incomplete. Expected 2 tables, found {}",
                rows.len()
            ),
            None,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_pool_and_migrations() {
        let pool = create_pool("sqlite::memory:")
            .await
            .expect("Failed to create pool");

        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('service_professionals', 'bookings')",
        )
        .fetch_one(&pool)
        .await
        .expect("Failed to query tables");

        assert_eq!(result.0, 2);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = create_pool("sqlite::memory:")
            .await
            .expect("Failed to create pool");

        run_migrations(&pool)
            .await
            .expect("Re-running migrations should succeed");
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let pool = create_pool("sqlite::memory:")
            .await
            .expect("Failed to create pool");

        let result: (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .expect("Failed to query foreign keys");

        assert_eq!(result.0, 1, "Foreign keys should be enabled");
    }
}
