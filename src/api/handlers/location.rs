//! HTTP location endpoints: the non-real-time fallback and polling read.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::{info, instrument};

use crate::api::extractors::ProfessionalIdPath;
use crate::api::middleware::error::ApiError;
use crate::api::models::{
    ErrorResponse, LocationUpdateRequest, LocationUpdateResponse, ProfessionalLocationResponse,
};
use crate::app_state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/professionals/{id}/location",
    params(
        ("id" = i64, Path, description = "Professional id")
    ),
    request_body = LocationUpdateRequest,
    responses(
        (status = 200, description = "Location recorded and broadcast", body = LocationUpdateResponse),
        (status = 400, description = "Non-numeric id or coordinates", body = ErrorResponse),
        (status = 404, description = "Unknown professional", body = ErrorResponse),
        (status = 500, description = "Booking directory failure", body = ErrorResponse)
    ),
    tag = "Location"
)]
/// Records a professional's location and pushes it to every authorized,
/// connected customer before responding.
#[instrument(skip_all, fields(professional_id = professional_id))]
pub async fn update_location(
    State(state): State<AppState>,
    ProfessionalIdPath(professional_id): ProfessionalIdPath,
    body: Result<Json<LocationUpdateRequest>, JsonRejection>,
) -> Result<Json<LocationUpdateResponse>, ApiError> {
    let Json(request) = body?;

    if state.engine.directory().professional(professional_id).await?.is_none() {
        return Err(ApiError::NotFound(format!(
            "Professional {professional_id} not found"
        )));
    }

    let report = state
        .engine
        .on_professional_location_update(professional_id, request.into())
        .await?;

    info!(
        authorized = report.authorized,
        delivered = report.delivered,
        "Location updated over HTTP"
    );

    Ok(Json(LocationUpdateResponse {
        success: true,
        authorized: report.authorized,
        delivered: report.delivered,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/professionals/{id}/location",
    params(
        ("id" = i64, Path, description = "Professional id")
    ),
    responses(
        (status = 200, description = "Last known location", body = ProfessionalLocationResponse),
        (status = 400, description = "Non-numeric id", body = ErrorResponse),
        (status = 404, description = "No location reported", body = ErrorResponse)
    ),
    tag = "Location"
)]
/// Returns the professional's last reported location.
#[instrument(skip_all, fields(professional_id = professional_id))]
pub async fn get_location(
    State(state): State<AppState>,
    ProfessionalIdPath(professional_id): ProfessionalIdPath,
) -> Result<Json<ProfessionalLocationResponse>, ApiError> {
    let data = state
        .engine
        .locations()
        .last_known(professional_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "No location reported for professional {professional_id}"
            ))
        })?;

    Ok(Json(ProfessionalLocationResponse {
        professional_id,
        data,
    }))
}
