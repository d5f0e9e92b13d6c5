//! HTTP API: the live location channel, the HTTP fallback and health.

pub mod docs;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod server;
