//! Core domain types shared by the directory, registry and channel layers.
//!
//! ## Identities
//!
//! Every live channel is bound to exactly one [`Identity`]. Professional ids
//! and customer (user) ids are drawn from independent id spaces, so the two
//! variants are never compared with each other.
//!
//! ## Tracking authorization
//!
//! A customer may see a professional's position only while one of their
//! bookings against that professional is [`BookingStatus::Confirmed`] or
//! [`BookingStatus::InProgress`]. See [`BookingStatus::is_trackable`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Numeric id of a service professional.
pub type ProfessionalId = i64;

/// Numeric id of a customer account.
pub type UserId = i64;

/// Role half of a channel identity, as sent in the handshake `type` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A professional streaming their own position.
    Professional,
    /// A customer watching professionals they have booked.
    User,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::User => "user",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "professional" => Ok(Self::Professional),
            "user" | "customer" => Ok(Self::User),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The role + numeric id pair a channel is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Identity {
    /// A professional channel.
    Professional(ProfessionalId),
    /// A customer channel.
    Customer(UserId),
}

impl Identity {
    /// Role of this identity.
    #[must_use]
    pub const fn role(self) -> Role {
        match self {
            Self::Professional(_) => Role::Professional,
            Self::Customer(_) => Role::User,
        }
    }

    /// Numeric id of this identity within its role's id space.
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::Professional(id) | Self::Customer(id) => id,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role(), self.id())
    }
}

/// A geographic position. No range validation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate from a latitude/longitude pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Lifecycle status of a booking.
///
/// Stored as lowercase snake_case text. Strings outside the known set decode
/// to [`BookingStatus::Unknown`] rather than failing the whole lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Requested, not yet accepted by the professional
    Pending,
    /// Accepted for a future date
    Scheduled,
    /// Accepted and active today
    Confirmed,
    /// The professional is on the way or on site
    InProgress,
    /// Service finished
    Completed,
    /// Cancelled by either party
    Cancelled,
    /// Any status string this build does not recognize
    #[serde(other)]
    Unknown,
}

impl BookingStatus {
    /// Whether a booking in this status authorizes location tracking.
    #[must_use]
    pub const fn is_trackable(self) -> bool {
        matches!(self, Self::Confirmed | Self::InProgress)
    }

    /// Storage / wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Scheduled => "scheduled",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for BookingStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "pending" => Self::Pending,
            "scheduled" => Self::Scheduled,
            "confirmed" => Self::Confirmed,
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            _ => Self::Unknown,
        })
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A booking as exposed by the booking directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Booking id
    pub id: i64,
    /// Customer who made the booking
    pub user_id: UserId,
    /// Professional the booking is against
    pub professional_id: ProfessionalId,
    /// Requested service (e.g. "Leak Repair")
    pub service_type: String,
    /// Service address
    pub address: String,
    /// Current lifecycle status
    pub status: BookingStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Directory view of a professional, including the last reported position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalRecord {
    /// Professional id
    pub id: ProfessionalId,
    /// Account id of the professional
    pub user_id: UserId,
    /// Display title (e.g. "Master Plumber")
    pub title: String,
    /// Whether the professional currently accepts bookings
    pub is_available: bool,
    /// Last reported latitude, absent until the first report
    pub latitude: Option<f64>,
    /// Last reported longitude, absent until the first report
    pub longitude: Option<f64>,
}

impl ProfessionalRecord {
    /// Last reported coordinate, if both halves are present.
    #[must_use]
    pub fn location(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_confirmed_and_in_progress_are_trackable() {
        assert!(BookingStatus::Confirmed.is_trackable());
        assert!(BookingStatus::InProgress.is_trackable());
        for status in [
            BookingStatus::Pending,
            BookingStatus::Scheduled,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
            BookingStatus::Unknown,
        ] {
            assert!(!status.is_trackable(), "{status} must not be trackable");
        }
    }

    #[test]
    fn test_status_parsing_is_lenient() {
        assert_eq!("in_progress".parse(), Ok(BookingStatus::InProgress));
        assert_eq!("on_hold".parse(), Ok(BookingStatus::Unknown));
    }

    #[test]
    fn test_status_serde_uses_snake_case() {
        let json = serde_json::to_string(&BookingStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let parsed: BookingStatus = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(parsed, BookingStatus::Unknown);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("professional".parse(), Ok(Role::Professional));
        assert_eq!("user".parse(), Ok(Role::User));
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_identity_spaces_are_distinct() {
        assert_ne!(Identity::Professional(3), Identity::Customer(3));
        assert_eq!(Identity::Customer(3).to_string(), "user:3");
    }

    #[test]
    fn test_location_requires_both_halves() {
        let mut record = ProfessionalRecord {
            id: 1,
            user_id: 2,
            title: "Master Plumber".to_string(),
            is_available: true,
            latitude: Some(40.71),
            longitude: None,
        };
        assert_eq!(record.location(), None);
        record.longitude = Some(-74.0);
        assert_eq!(record.location(), Some(Coordinate::new(40.71, -74.0)));
    }
}
