//! Demo marketplace rows loaded when `SEED_DEMO_DATA` is enabled.
//!
//! Customer 1 has a completed booking with professional 1, a scheduled one
//! with professional 2, and a confirmed one with professional 3, so only
//! professional 3 is trackable for that customer out of the box.

use crate::domain::{BookingStatus, ProfessionalRecord, UserId};

/// Input for creating a booking in a directory backend.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    /// Customer making the booking
    pub user_id: UserId,
    /// Professional being booked
    pub professional_id: i64,
    /// Requested service
    pub service_type: String,
    /// Service address
    pub address: String,
    /// Initial status
    pub status: BookingStatus,
}

impl NewBooking {
    /// Booking with placeholder service details, mostly for tests.
    #[must_use]
    pub fn new(user_id: UserId, professional_id: i64, status: BookingStatus) -> Self {
        Self {
            user_id,
            professional_id,
            service_type: "General Service".to_string(),
            address: "123 Main St, City".to_string(),
            status,
        }
    }
}

/// Professionals in the demo catalog.
#[must_use]
pub fn demo_professionals() -> Vec<ProfessionalRecord> {
    vec![
        ProfessionalRecord {
            id: 1,
            user_id: 2,
            title: "Plumbing Specialist".to_string(),
            is_available: true,
            latitude: Some(40.7128),
            longitude: Some(-74.0060),
        },
        ProfessionalRecord {
            id: 2,
            user_id: 3,
            title: "Electrical Technician".to_string(),
            is_available: true,
            latitude: Some(40.7148),
            longitude: Some(-74.0068),
        },
        ProfessionalRecord {
            id: 3,
            user_id: 4,
            title: "Carpenter".to_string(),
            is_available: false,
            latitude: Some(40.7135),
            longitude: Some(-74.0055),
        },
    ]
}

/// Bookings in the demo data set, all made by customer 1.
#[must_use]
pub fn demo_bookings() -> Vec<NewBooking> {
    vec![
        NewBooking {
            user_id: 1,
            professional_id: 1,
            service_type: "Leak Repair".to_string(),
            address: "123 Main St, Apt 4B, City".to_string(),
            status: BookingStatus::Completed,
        },
        NewBooking {
            user_id: 1,
            professional_id: 2,
            service_type: "Light Fixture Installation".to_string(),
            address: "123 Main St, Apt 4B, City".to_string(),
            status: BookingStatus::Scheduled,
        },
        NewBooking {
            user_id: 1,
            professional_id: 3,
            service_type: "Cabinet Repair".to_string(),
            address: "123 Main St, Apt 4B, City".to_string(),
            status: BookingStatus::Confirmed,
        },
    ]
}
