//! Rate limiting middleware.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::warn;

use crate::api::middleware::error::ApiError;

/// Shared rate limiter type.
pub type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Create a rate limiter with the specified RPM quota.
///
/// A zero quota is raised to one request per minute.
#[must_use]
pub fn create_rate_limiter(requests_per_minute: u32) -> SharedRateLimiter {
    let quota = Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Rate limiting middleware.
pub async fn rate_limit(limiter: SharedRateLimiter, request: Request, next: Next) -> Response {
    if limiter.check().is_ok() {
        next.run(request).await
    } else {
        warn!(uri = %request.uri().path(), "Rate limit exceeded");
        ApiError::RateLimitExceeded.into_response()
    }
}
