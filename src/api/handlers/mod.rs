//! HTTP and channel handlers for API endpoints.

pub mod channel;
pub mod health;
pub mod location;
