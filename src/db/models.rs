//! Database models that map to SQL tables.
//!
//! Rows are converted into the domain types the relay works with; status
//! text and unix timestamps are decoded here.

use chrono::{DateTime, Utc};

use crate::domain::{Booking, BookingStatus, ProfessionalRecord};

/// Row of the `service_professionals` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfessionalRow {
    /// Professional id
    pub id: i64,
    /// Account id of the professional
    pub user_id: i64,
    /// Display title
    pub title: String,
    /// Availability flag
    pub is_available: bool,
    /// Last reported latitude
    pub latitude: Option<f64>,
    /// Last reported longitude
    pub longitude: Option<f64>,
}

impl From<ProfessionalRow> for ProfessionalRecord {
    fn from(row: ProfessionalRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            is_available: row.is_available,
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}

/// Row of the `bookings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookingRow {
    /// Booking id
    pub id: i64,
    /// Customer id
    pub user_id: i64,
    /// Professional id
    pub professional_id: i64,
    /// Requested service
    pub service_type: String,
    /// Service address
    pub address: String,
    /// Status text (e.g. "in_progress")
    pub status: String,
    /// Unix timestamp when the booking was created
    pub created_at: i64,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        let status = row
            .status
            .parse::<BookingStatus>()
            .unwrap_or(BookingStatus::Unknown);
        Self {
            id: row.id,
            user_id: row.user_id,
            professional_id: row.professional_id,
            service_type: row.service_type,
            address: row.address,
            status,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_else(Utc::now),
        }
    }
}
