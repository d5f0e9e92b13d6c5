//! Custom extractors for API parameters.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::api::middleware::error::ApiError;
use crate::domain::ProfessionalId;

/// Extracts a numeric professional id from the `{id}` path segment.
///
/// Rejects non-numeric ids with `400 Bad Request`.
pub struct ProfessionalIdPath(pub ProfessionalId);

#[axum::async_trait]
impl<S> FromRequestParts<S> for ProfessionalIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        raw.trim().parse::<ProfessionalId>().map(Self).map_err(|_| {
            ApiError::BadRequest(format!("'{raw}' is not a numeric professional id"))
        })
    }
}
