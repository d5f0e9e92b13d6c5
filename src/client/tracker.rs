//! Customer-side location tracker.

use std::collections::HashMap;
use std::sync::Arc;

use eyre::WrapErr;
use futures_util::StreamExt;
use tokio::sync::RwLock;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, instrument, warn};

use crate::client::{channel_url, Backoff, ChannelStream};
use crate::domain::{Coordinate, Identity, ProfessionalId, UserId};
use crate::error::{RelayError, RelayResult};
use crate::protocol::OutboundMessage;

/// Follows every professional a customer is authorized to track.
///
/// The tracker holds the latest coordinate per professional. On disconnect
/// it reconnects with exponential backoff; the server replays current
/// positions on every new handshake, so nothing needs to be resent.
pub struct LocationTracker {
    server: String,
    user_id: UserId,
    locations: Arc<RwLock<HashMap<ProfessionalId, Coordinate>>>,
    backoff: Backoff,
    max_attempts: Option<u32>,
}

impl LocationTracker {
    /// Create a tracker for `user_id` against the server at `server`.
    ///
    /// Defaults to at most 10 consecutive failed attempts.
    #[must_use]
    pub fn new(server: impl Into<String>, user_id: UserId) -> Self {
        Self {
            server: server.into(),
            user_id,
            locations: Arc::new(RwLock::new(HashMap::new())),
            backoff: Backoff::default(),
            max_attempts: Some(10),
        }
    }

    /// Replace the reconnect schedule. `None` retries forever.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff, max_attempts: Option<u32>) -> Self {
        self.backoff = backoff;
        self.max_attempts = max_attempts;
        self
    }

    /// Latest coordinate received for `professional_id`.
    pub async fn location_of(&self, professional_id: ProfessionalId) -> Option<Coordinate> {
        self.locations.read().await.get(&professional_id).copied()
    }

    /// Latest coordinate for every professional seen so far.
    pub async fn snapshot(&self) -> HashMap<ProfessionalId, Coordinate> {
        self.locations.read().await.clone()
    }

    /// Apply one server frame to the tracked locations.
    ///
    /// Returns the professional and coordinate if the frame was a location
    /// push. Anything else is ignored.
    pub async fn apply_frame(&self, text: &str) -> Option<(ProfessionalId, Coordinate)> {
        match serde_json::from_str::<OutboundMessage>(text) {
            Ok(OutboundMessage::ProfessionalLocation {
                professional_id,
                data,
            }) => {
                self.locations.write().await.insert(professional_id, data);
                Some((professional_id, data))
            }
            Ok(OutboundMessage::Location { .. }) => None,
            Err(e) => {
                debug!(error = %e, "Ignoring unrecognized frame");
                None
            }
        }
    }

    /// Track until the reconnect budget is exhausted.
    ///
    /// `on_update` is called for every location push, including replays.
    ///
    /// # Errors
    ///
    /// Returns a client error if the server URL is invalid or after
    /// `max_attempts` consecutive failed connection attempts.
    #[instrument(skip(self, on_update), fields(user_id = self.user_id))]
    pub async fn run<F>(&self, mut on_update: F) -> RelayResult<()>
    where
        F: FnMut(ProfessionalId, Coordinate) + Send,
    {
        let url = channel_url(&self.server, Identity::Customer(self.user_id))?;
        let mut backoff = self.backoff.clone();

        loop {
            match connect(&url).await {
                Ok(stream) => {
                    info!("Tracking channel connected");
                    backoff.reset();
                    self.consume(stream, &mut on_update).await;
                    warn!("Tracking channel closed");
                }
                Err(e) => {
                    warn!(error = %e, attempt = backoff.attempt() + 1, "Tracking connect failed");
                }
            }

            if self.max_attempts.is_some_and(|max| backoff.attempt() + 1 >= max) {
                return Err(RelayError::client(
                    format!("gave up reconnecting to {url}"),
                    None,
                ));
            }

            let delay = backoff.next_delay();
            debug!(delay_ms = delay.as_millis(), "Reconnecting after delay");
            tokio::time::sleep(delay).await;
        }
    }

    async fn consume<F>(&self, mut stream: ChannelStream, on_update: &mut F)
    where
        F: FnMut(ProfessionalId, Coordinate) + Send,
    {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    if let Some((professional_id, data)) = self.apply_frame(&text).await {
                        on_update(professional_id, data);
                    }
                }
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "Server closed tracking channel");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    debug!(error = %e, "Tracking channel transport error");
                    break;
                }
            }
        }
    }
}

async fn connect(url: &str) -> RelayResult<ChannelStream> {
    let (stream, _response) = connect_async(url)
        .await
        .wrap_err_with(|| format!("connecting to {url}"))?;
    Ok(stream)
}
