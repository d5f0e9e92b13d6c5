//! Client side of the relay.
//!
//! - [`LocationTracker`]: a customer's view. Connects as `user`, keeps the
//!   latest coordinate per tracked professional and reconnects with backoff.
//! - [`LocationUpdater`]: a professional's device. Sends `location` frames
//!   over the channel and falls back to the HTTP endpoint when the channel is
//!   unavailable.
//!
//! Both take the server's HTTP base URL (e.g. `http://127.0.0.1:5000`); the
//! channel URL is derived from it.

pub mod backoff;
pub mod tracker;
pub mod updater;

pub use backoff::Backoff;
pub use tracker::LocationTracker;
pub use updater::{Delivery, LocationUpdater};

use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::domain::{Identity, ProfessionalId};
use crate::error::{RelayError, RelayResult};

/// Client-side channel stream.
pub type ChannelStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Build the channel URL for `identity` from an HTTP(S) or WS(S) base URL.
///
/// # Errors
///
/// Returns a client error if the base URL has an unsupported scheme.
pub fn channel_url(base: &str, identity: Identity) -> RelayResult<String> {
    let base = base.trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if base.starts_with("ws://") || base.starts_with("wss://") {
        base.to_string()
    } else {
        return Err(RelayError::client(
            format!("unsupported server URL '{base}', expected http(s):// or ws(s)://"),
            None,
        ));
    };

    let query = match identity {
        Identity::Professional(id) => format!("type=professional&professionalId={id}"),
        Identity::Customer(id) => format!("type=user&userId={id}"),
    };

    Ok(format!("{ws_base}/ws?{query}"))
}

/// Build the HTTP fallback URL for a professional's location.
///
/// # Errors
///
/// Returns a client error if the base URL has an unsupported scheme.
pub fn location_url(base: &str, professional_id: ProfessionalId) -> RelayResult<String> {
    let base = base.trim_end_matches('/');
    let http_base = if base.starts_with("http://") || base.starts_with("https://") {
        base.to_string()
    } else if let Some(rest) = base.strip_prefix("wss://") {
        format!("https://{rest}")
    } else if let Some(rest) = base.strip_prefix("ws://") {
        format!("http://{rest}")
    } else {
        return Err(RelayError::client(
            format!("unsupported server URL '{base}', expected http(s):// or ws(s)://"),
            None,
        ));
    };

    Ok(format!(
        "{http_base}/api/v1/professionals/{professional_id}/location"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_url_per_role() {
        assert_eq!(
            channel_url("http://localhost:5000/", Identity::Customer(3)).unwrap(),
            "ws://localhost:5000/ws?type=user&userId=3"
        );
        assert_eq!(
            channel_url("https://relay.test", Identity::Professional(7)).unwrap(),
            "wss://relay.test/ws?type=professional&professionalId=7"
        );
    }

    #[test]
    fn test_location_url_from_ws_base() {
        assert_eq!(
            location_url("ws://localhost:5000", 7).unwrap(),
            "http://localhost:5000/api/v1/professionals/7/location"
        );
    }

    #[test]
    fn test_rejects_unknown_scheme() {
        assert!(channel_url("ftp://relay.test", Identity::Customer(1)).is_err());
        assert!(location_url("relay.test", 1).is_err());
    }
}
