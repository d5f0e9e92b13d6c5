//! Repository pattern for directory database operations.
//!
//! Provides the booking directory lookups over SQLite plus the insert and
//! status-change operations used to seed the store.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, instrument};

use super::models::{BookingRow, ProfessionalRow};
use crate::directory::seed::{demo_bookings, demo_professionals, NewBooking};
use crate::directory::BookingDirectory;
use crate::domain::{Booking, BookingStatus, ProfessionalId, ProfessionalRecord, UserId};
use crate::error::RelayError;

const BOOKING_COLUMNS: &str =
    "id, user_id, professional_id, service_type, address, status, created_at";

const PROFESSIONAL_COLUMNS: &str = "id, user_id, title, is_available, latitude, longitude";

/// Repository for directory database operations.
///
/// Wraps a SQLite connection pool and provides type-safe methods
/// for all database interactions.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Creates a new repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== SEEDING OPERATIONS ====================

    /// Inserts or replaces a professional row.
    pub async fn insert_professional(&self, record: &ProfessionalRecord) -> Result<(), RelayError> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO service_professionals (
                id, user_id, title, is_available, latitude, longitude
            )
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.title)
        .bind(record.is_available)
        .bind(record.latitude)
        .bind(record.longitude)
        .execute(&self.pool)
        .await
        .map_err(|e| RelayError::directory("Failed to insert professional", Some(Box::new(e))))?;

        Ok(())
    }

    /// Inserts a booking and returns it with its database id.
    pub async fn insert_booking(&self, booking: &NewBooking) -> Result<Booking, RelayError> {
        let created_at = Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO bookings (
                user_id, professional_id, service_type, address, status, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(booking.user_id)
        .bind(booking.professional_id)
        .bind(&booking.service_type)
        .bind(&booking.address)
        .bind(booking.status.as_str())
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RelayError::directory("Failed to insert booking", Some(Box::new(e))))?;

        let id = result.last_insert_rowid();
        debug!(booking_id = id, status = %booking.status, "Booking inserted");

        Ok(BookingRow {
            id,
            user_id: booking.user_id,
            professional_id: booking.professional_id,
            service_type: booking.service_type.clone(),
            address: booking.address.clone(),
            status: booking.status.as_str().to_string(),
            created_at,
        }
        .into())
    }

    /// Changes a booking's status. Returns `None` for unknown bookings.
    pub async fn update_booking_status(
        &self,
        booking_id: i64,
        status: BookingStatus,
    ) -> Result<Option<Booking>, RelayError> {
        let result = sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(booking_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                RelayError::directory("Failed to update booking status", Some(Box::new(e)))
            })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?"
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RelayError::directory("Failed to query booking", Some(Box::new(e))))?;

        Ok(row.map(Booking::from))
    }

    /// Loads the demo marketplace rows unless professionals already exist.
    pub async fn seed_demo_data(&self) -> Result<(), RelayError> {
        let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM service_professionals")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                RelayError::directory("Failed to count professionals", Some(Box::new(e)))
            })?;

        if existing > 0 {
            debug!(existing, "Directory already populated, skipping demo seed");
            return Ok(());
        }

        for professional in demo_professionals() {
            self.insert_professional(&professional).await?;
        }
        for booking in demo_bookings() {
            self.insert_booking(&booking).await?;
        }

        info!("Seeded directory database with demo data");
        Ok(())
    }
}

#[axum::async_trait]
impl BookingDirectory for Repository {
    #[instrument(skip(self))]
    async fn bookings_for_professional(
        &self,
        professional_id: ProfessionalId,
    ) -> Result<Vec<Booking>, RelayError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE professional_id = ? ORDER BY id"
        ))
        .bind(professional_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            RelayError::directory(
                "Failed to query bookings for professional",
                Some(Box::new(e)),
            )
        })?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }

    #[instrument(skip(self))]
    async fn bookings_for_user(&self, user_id: UserId) -> Result<Vec<Booking>, RelayError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = ? ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            RelayError::directory("Failed to query bookings for user", Some(Box::new(e)))
        })?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn professional(
        &self,
        id: ProfessionalId,
    ) -> Result<Option<ProfessionalRecord>, RelayError> {
        let row = sqlx::query_as::<_, ProfessionalRow>(&format!(
            "SELECT {PROFESSIONAL_COLUMNS} FROM service_professionals WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RelayError::directory("Failed to query professional", Some(Box::new(e))))?;

        Ok(row.map(ProfessionalRecord::from))
    }

    async fn update_professional_location(
        &self,
        id: ProfessionalId,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<ProfessionalRecord>, RelayError> {
        let result =
            sqlx::query("UPDATE service_professionals SET latitude = ?, longitude = ? WHERE id = ?")
                .bind(latitude)
                .bind(longitude)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    RelayError::directory(
                        "Failed to update professional location",
                        Some(Box::new(e)),
                    )
                })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.professional(id).await
    }

    async fn health_check(&self) -> Result<(), RelayError> {
        sqlx::query("SELECT 1 as check")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                RelayError::directory("Database health check failed", Some(Box::new(e)))
            })?;

        Ok(())
    }
}
