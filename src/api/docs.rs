//! OpenAPI documentation for the HTTP API.

use utoipa::OpenApi;

use crate::api::handlers;

/// OpenAPI documentation for the HTTP API.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::location::update_location,
        handlers::location::get_location,
        handlers::channel::channel_handler,
    ),
    components(schemas(
        crate::domain::Coordinate,
        crate::api::models::LocationUpdateRequest,
        crate::api::models::LocationUpdateResponse,
        crate::api::models::ProfessionalLocationResponse,
        crate::api::models::HealthResponse,
        crate::api::models::HealthStatus,
        crate::api::models::ChannelCounts,
        crate::api::models::ErrorResponse,
    )),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Location", description = "HTTP location fallback and polling"),
        (name = "Channel", description = "Live location channel"),
    ),
    info(
        title = "Location Relay API",
        version = "1.0.0",
        description = "Booking-scoped live location relay for professionals and customers",
    )
)]
pub struct ApiDoc;
