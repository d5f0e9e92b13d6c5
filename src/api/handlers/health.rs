//! Health check endpoint.

use axum::{extract::State, Json};
use std::time::SystemTime;
use tracing::{instrument, warn};

use crate::api::models::{ChannelCounts, HealthResponse, HealthStatus};
use crate::app_state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service health", body = HealthResponse)
    ),
    tag = "Health"
)]
/// Returns service health information.
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = SystemTime::now()
        .duration_since(state.start_time)
        .unwrap_or_default()
        .as_secs();

    let directory_status = match state.engine.directory().health_check().await {
        Ok(()) => HealthStatus::Healthy,
        Err(e) => {
            warn!(error = %e, "Booking directory health check failed");
            HealthStatus::Unhealthy
        }
    };

    let registry = state.engine.registry();
    let channels = ChannelCounts {
        professionals: registry.professional_count().await,
        customers: registry.customer_count().await,
    };

    Json(HealthResponse {
        status: directory_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        directory_status,
        channels,
    })
}
