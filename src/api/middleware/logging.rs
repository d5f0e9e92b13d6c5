//! Request logging middleware using tracing.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{debug, info};

/// Logs incoming requests and response metadata.
///
/// Channel upgrades are logged at debug; the session itself logs the
/// connect and disconnect.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    if status == 101 {
        debug!(method = %method, uri = %uri, status, duration_ms, "Channel upgraded");
    } else {
        info!(method = %method, uri = %uri, status, duration_ms, "Request completed");
    }

    response
}
