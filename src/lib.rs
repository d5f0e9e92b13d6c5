//! # Location Relay
//!
//! Real-time location relay for a service-booking marketplace. Professionals
//! travelling to a job stream their coordinates; customers holding a
//! confirmed or in-progress booking against that professional receive each
//! update live.
//!
//! ## Architecture
//!
//! Leaves first:
//!
//! 1. **Booking directory** ([`directory`], [`db`]) - bookings, statuses and
//!    professional records, in memory or in SQLite
//! 2. **Location store** ([`location`]) - last known coordinate per
//!    professional, kept on the professional record
//! 3. **Connection registry** ([`registry`]) - identity to live channel
//! 4. **Broadcast engine** ([`broadcast`]) - booking-scoped fan-out
//! 5. **Channel session** ([`session`], [`protocol`]) - handshake, replay,
//!    inbound frames and teardown
//! 6. **HTTP API** ([`api`]) - the `/ws` channel endpoint, HTTP fallback,
//!    polling read and health
//!
//! Data flow:
//!
//! ```text
//! professional ─location─▶ session ─▶ location store
//!                                  └▶ broadcast engine ─▶ directory (recipients)
//!                                                      └▶ registry ─▶ customer channels
//! ```
//!
//! The [`client`] module holds the customer tracker and the professional
//! updater used by the `watch` and `report` commands.
//!
//! ## Quick Start
//!
//! ```bash
//! # In-memory directory seeded with demo bookings
//! cargo run -- serve
//!
//! # Customer 1 follows their confirmed professionals
//! cargo run -- watch --user 1
//!
//! # Professional 3 reports a position
//! cargo run -- report --professional 3 --lat 40.7135 --lon -74.0055
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`error::RelayResult<T>`](error::RelayResult):
//!
//! ```rust
//! use location_relay::error::RelayResult;
//!
//! fn example() -> RelayResult<()> {
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod api;
pub mod app_state;
pub mod broadcast;
pub mod cli;
pub mod client;
pub mod config;
pub mod db;
pub mod directory;
pub mod domain;
pub mod error;
pub mod location;
pub mod observability;
pub mod protocol;
pub mod registry;
pub mod session;
