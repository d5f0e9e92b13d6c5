//! API request and response models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Coordinate, ProfessionalId};

/// Body of the HTTP location fallback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct LocationUpdateRequest {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl From<LocationUpdateRequest> for Coordinate {
    fn from(request: LocationUpdateRequest) -> Self {
        Self::new(request.latitude, request.longitude)
    }
}

/// Acknowledgement of an HTTP location update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationUpdateResponse {
    /// Always `true` when the update was recorded
    pub success: bool,
    /// Authorized customers tracking this professional
    pub authorized: usize,
    /// Customers whose live channel received the update
    pub delivered: usize,
}

/// Last known location of a professional.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalLocationResponse {
    /// Professional id
    pub professional_id: ProfessionalId,
    /// Last reported coordinate
    pub data: Coordinate,
}

/// Live channel counts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChannelCounts {
    /// Registered professional channels
    pub professionals: usize,
    /// Registered customer channels
    pub customers: usize,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Overall health status
    pub status: HealthStatus,
    /// Application version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Booking directory status
    pub directory_status: HealthStatus,
    /// Registered channels
    pub channels: ChannelCounts,
}

/// Health status states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All services healthy
    Healthy,
    /// Partial degradation
    Degraded,
    /// Unhealthy state
    Unhealthy,
}

/// Error response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type
    pub error: String,
    /// Human-readable message
    pub message: String,
    /// Optional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
