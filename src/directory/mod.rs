//! Booking directory boundary.
//!
//! The relay does not own bookings or the professional catalog. It consumes
//! them through the [`BookingDirectory`] trait, which mirrors the four lookups
//! the marketplace backend exposes:
//!
//! - bookings for a professional
//! - bookings for a user
//! - a professional record (carrying the last stored coordinate)
//! - the professional location write path
//!
//! Two implementations ship with the crate:
//!
//! - [`MemoryDirectory`]: process-local tables, used by default and in tests
//! - [`crate::db::repository::Repository`]: SQLite via `sqlx`

pub mod memory;
pub mod seed;

use std::sync::Arc;

use crate::domain::{Booking, ProfessionalId, ProfessionalRecord, UserId};
use crate::error::RelayResult;

pub use memory::MemoryDirectory;
pub use seed::NewBooking;

/// Shared, dynamically dispatched directory handle.
pub type SharedDirectory = Arc<dyn BookingDirectory>;

/// Read/write surface of the booking and catalog subsystem used by the relay.
#[axum::async_trait]
pub trait BookingDirectory: Send + Sync {
    /// All bookings against a professional, in any status.
    async fn bookings_for_professional(
        &self,
        professional_id: ProfessionalId,
    ) -> RelayResult<Vec<Booking>>;

    /// All bookings made by a user, in any status.
    async fn bookings_for_user(&self, user_id: UserId) -> RelayResult<Vec<Booking>>;

    /// Look up a professional record.
    async fn professional(&self, id: ProfessionalId) -> RelayResult<Option<ProfessionalRecord>>;

    /// Overwrite a professional's stored location.
    ///
    /// Returns the updated record, or `None` if the professional is unknown.
    async fn update_professional_location(
        &self,
        id: ProfessionalId,
        latitude: f64,
        longitude: f64,
    ) -> RelayResult<Option<ProfessionalRecord>>;

    /// Check that the backing store is reachable.
    async fn health_check(&self) -> RelayResult<()> {
        Ok(())
    }
}
