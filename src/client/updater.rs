//! Professional-side location updater.

use std::time::Duration;

use eyre::WrapErr;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, instrument, warn};

use crate::api::models::{ErrorResponse, LocationUpdateRequest, LocationUpdateResponse};
use crate::client::{channel_url, location_url, ChannelStream};
use crate::domain::{Coordinate, Identity, ProfessionalId};
use crate::error::{RelayError, RelayResult};
use crate::protocol::{InboundMessage, OutboundMessage};

/// How a location update left the device.
#[derive(Debug, Clone)]
pub enum Delivery {
    /// Sent as a `location` frame on the live channel.
    Channel,
    /// Posted to the HTTP endpoint, which broadcast it before answering.
    Http(LocationUpdateResponse),
}

/// Reports a professional's position to the relay.
pub struct LocationUpdater {
    server: String,
    professional_id: ProfessionalId,
    http: reqwest::Client,
    channel: Option<ChannelStream>,
}

impl LocationUpdater {
    /// Create an updater for `professional_id`. No connection is made yet.
    #[must_use]
    pub fn new(server: impl Into<String>, professional_id: ProfessionalId) -> Self {
        Self {
            server: server.into(),
            professional_id,
            http: reqwest::Client::new(),
            channel: None,
        }
    }

    /// Whether a live channel is currently held.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    /// Open the live channel.
    ///
    /// # Errors
    ///
    /// Returns a client error if the handshake fails. The updater remains
    /// usable through the HTTP fallback.
    #[instrument(skip(self), fields(professional_id = self.professional_id))]
    pub async fn connect(&mut self) -> RelayResult<()> {
        let url = channel_url(&self.server, Identity::Professional(self.professional_id))?;
        let (stream, _response) = connect_async(url.as_str())
            .await
            .wrap_err_with(|| format!("connecting to {url}"))?;

        info!("Location channel connected");
        self.channel = Some(stream);
        Ok(())
    }

    /// Wait up to `wait` for the server's replay of this professional's last
    /// stored position.
    ///
    /// Returns `None` if nothing arrives in time, which is the normal outcome
    /// when no position was ever reported.
    pub async fn last_echo(&mut self, wait: Duration) -> Option<Coordinate> {
        let stream = self.channel.as_mut()?;

        let echo = tokio::time::timeout(wait, async {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        if let Ok(OutboundMessage::Location { data }) =
                            serde_json::from_str::<OutboundMessage>(&text)
                        {
                            return Some(data);
                        }
                    }
                    Ok(Message::Close(_)) | Err(_) => return None,
                    Ok(_) => {}
                }
            }
            None
        })
        .await;

        echo.ok().flatten()
    }

    /// Report a position, over the channel when held, otherwise over HTTP.
    ///
    /// A failed channel send drops the channel and retries over HTTP.
    ///
    /// # Errors
    ///
    /// Returns a client error if the HTTP fallback also fails or is rejected.
    #[instrument(skip(self), fields(professional_id = self.professional_id))]
    pub async fn send(&mut self, coordinate: Coordinate) -> RelayResult<Delivery> {
        if let Some(stream) = self.channel.as_mut() {
            let frame = serde_json::to_string(&InboundMessage::Location { data: coordinate })
                .map_err(|e| {
                    RelayError::protocol("Failed to encode location frame", Some(Box::new(e)))
                })?;

            match stream.send(Message::Text(frame)).await {
                Ok(()) => {
                    debug!("Location sent over channel");
                    return Ok(Delivery::Channel);
                }
                Err(e) => {
                    warn!(error = %e, "Channel send failed, falling back to HTTP");
                    self.channel = None;
                }
            }
        }

        self.send_http(coordinate).await.map(Delivery::Http)
    }

    /// Report a position through the HTTP endpoint.
    ///
    /// # Errors
    ///
    /// Returns a client error if the request fails or the server rejects it.
    pub async fn send_http(&self, coordinate: Coordinate) -> RelayResult<LocationUpdateResponse> {
        let url = location_url(&self.server, self.professional_id)?;
        let body = LocationUpdateRequest {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .wrap_err_with(|| format!("posting location to {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map_or_else(|_| status.to_string(), |err| err.message);
            return Err(RelayError::client(
                format!("location update rejected ({status}): {message}"),
                None,
            ));
        }

        let ack = response
            .json::<LocationUpdateResponse>()
            .await
            .wrap_err("decoding location acknowledgement")?;

        debug!(delivered = ack.delivered, "Location sent over HTTP");
        Ok(ack)
    }

    /// Close the live channel, if held.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.channel.take() {
            if let Err(e) = stream.close(None).await {
                debug!(error = %e, "Channel close failed");
            }
        }
    }
}
