//! Axum server setup and routing.

use axum::http::HeaderValue;
use axum::{
    middleware,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{docs::ApiDoc, handlers, middleware as api_middleware};
use crate::app_state::AppState;
use crate::config::Config;

/// Build the application router with all routes and middleware.
pub fn build_router(state: AppState, rate_limit_rpm: u32, cors_origins: &[String]) -> Router {
    let limiter = api_middleware::rate_limit::create_rate_limiter(rate_limit_rpm);

    let api_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/professionals/:id/location",
            get(handlers::location::get_location).post(handlers::location::update_location),
        )
        .layer(middleware::from_fn(move |req, next| {
            api_middleware::rate_limit::rate_limit(limiter.clone(), req, next)
        }));

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(cors_origins))
        .layer(middleware::from_fn(api_middleware::logging::log_requests));

    Router::new()
        .route("/ws", get(handlers::channel::channel_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/v1", api_routes)
        .layer(middleware_stack)
        .with_state(state)
}

/// Run the Axum API server until the listener fails.
///
/// # Errors
///
/// Returns an error if the port cannot be bound or the server stops with an
/// I/O error.
pub async fn run_server(
    state: AppState,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(state, config.rate_limit_rpm(), config.cors_origins());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port()));
    info!(addr = %addr, "Starting location relay");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any).allow_headers(Any)
    } else {
        let headers: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new().allow_origin(headers).allow_headers(Any)
    }
}
