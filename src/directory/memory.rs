//! In-process booking directory.
//!
//! Tables live behind a single `tokio::sync::RwLock`. Lookups scan the
//! booking table, which matches the access pattern of the marketplace backend
//! this stands in for.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::seed::{demo_bookings, demo_professionals, NewBooking};
use super::BookingDirectory;
use crate::domain::{Booking, BookingStatus, ProfessionalId, ProfessionalRecord, UserId};
use crate::error::RelayResult;

#[derive(Default)]
struct Tables {
    professionals: HashMap<ProfessionalId, ProfessionalRecord>,
    bookings: BTreeMap<i64, Booking>,
    next_booking_id: i64,
}

/// Booking directory backed by process memory.
#[derive(Default)]
pub struct MemoryDirectory {
    tables: RwLock<Tables>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory pre-loaded with the demo marketplace rows.
    pub async fn with_demo_data() -> Self {
        let directory = Self::new();
        for professional in demo_professionals() {
            directory.insert_professional(professional).await;
        }
        for booking in demo_bookings() {
            directory.insert_booking(booking).await;
        }
        info!("Seeded in-memory directory with demo data");
        directory
    }

    /// Insert or replace a professional record.
    pub async fn insert_professional(&self, record: ProfessionalRecord) {
        let mut tables = self.tables.write().await;
        tables.professionals.insert(record.id, record);
    }

    /// Create a booking and return it with its assigned id.
    pub async fn insert_booking(&self, booking: NewBooking) -> Booking {
        let mut tables = self.tables.write().await;
        tables.next_booking_id += 1;
        let record = Booking {
            id: tables.next_booking_id,
            user_id: booking.user_id,
            professional_id: booking.professional_id,
            service_type: booking.service_type,
            address: booking.address,
            status: booking.status,
            created_at: Utc::now(),
        };
        tables.bookings.insert(record.id, record.clone());
        debug!(booking_id = record.id, status = %record.status, "Booking inserted");
        record
    }

    /// Change a booking's status. Returns `None` for unknown bookings.
    pub async fn update_booking_status(
        &self,
        booking_id: i64,
        status: BookingStatus,
    ) -> Option<Booking> {
        let mut tables = self.tables.write().await;
        let booking = tables.bookings.get_mut(&booking_id)?;
        booking.status = status;
        Some(booking.clone())
    }
}

#[axum::async_trait]
impl BookingDirectory for MemoryDirectory {
    async fn bookings_for_professional(
        &self,
        professional_id: ProfessionalId,
    ) -> RelayResult<Vec<Booking>> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookings
            .values()
            .filter(|b| b.professional_id == professional_id)
            .cloned()
            .collect())
    }

    async fn bookings_for_user(&self, user_id: UserId) -> RelayResult<Vec<Booking>> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookings
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn professional(&self, id: ProfessionalId) -> RelayResult<Option<ProfessionalRecord>> {
        Ok(self.tables.read().await.professionals.get(&id).cloned())
    }

    async fn update_professional_location(
        &self,
        id: ProfessionalId,
        latitude: f64,
        longitude: f64,
    ) -> RelayResult<Option<ProfessionalRecord>> {
        let mut tables = self.tables.write().await;
        Ok(tables.professionals.get_mut(&id).map(|record| {
            record.latitude = Some(latitude);
            record.longitude = Some(longitude);
            record.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinate;

    #[tokio::test]
    async fn test_demo_data_loaded() {
        let directory = MemoryDirectory::with_demo_data().await;

        let bookings = directory.bookings_for_user(1).await.unwrap();
        assert_eq!(bookings.len(), 3);

        let pro = directory.professional(1).await.unwrap().unwrap();
        assert_eq!(pro.location(), Some(Coordinate::new(40.7128, -74.0060)));
    }

    #[tokio::test]
    async fn test_bookings_are_filtered_by_owner() {
        let directory = MemoryDirectory::new();
        directory
            .insert_booking(NewBooking::new(3, 7, BookingStatus::Confirmed))
            .await;
        directory
            .insert_booking(NewBooking::new(9, 7, BookingStatus::Pending))
            .await;
        directory
            .insert_booking(NewBooking::new(3, 8, BookingStatus::InProgress))
            .await;

        assert_eq!(directory.bookings_for_professional(7).await.unwrap().len(), 2);
        assert_eq!(directory.bookings_for_user(3).await.unwrap().len(), 2);
        assert!(directory.bookings_for_user(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_location_of_unknown_professional() {
        let directory = MemoryDirectory::new();
        let updated = directory
            .update_professional_location(99, 1.0, 2.0)
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_update_booking_status() {
        let directory = MemoryDirectory::new();
        let booking = directory
            .insert_booking(NewBooking::new(3, 7, BookingStatus::Pending))
            .await;

        let updated = directory
            .update_booking_status(booking.id, BookingStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Confirmed);
        assert!(directory
            .update_booking_status(booking.id + 100, BookingStatus::Completed)
            .await
            .is_none());
    }
}
