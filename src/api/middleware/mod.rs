//! Middleware and error mapping for the HTTP API.

pub mod error;
pub mod logging;
pub mod rate_limit;
