//! Broadcast engine: booking-scoped fan-out of professional locations.
//!
//! For each reported coordinate the engine:
//!
//! 1. writes it through to the [`LocationStore`]
//! 2. asks the booking directory for the professional's bookings
//! 3. keeps customers whose booking is confirmed or in progress
//! 4. resolves each customer's live channel and pushes
//!    `professionalLocation`; customers without an open channel are skipped
//!
//! The authorized recipient set is recomputed from the directory on every
//! update and never cached. The directory lookup completes before any frame
//! is queued, and registry locks are released before sending.
//!
//! The engine also produces the one-shot replays a channel receives right
//! after its handshake.

use std::collections::BTreeSet;

use tracing::{debug, instrument};

use crate::directory::SharedDirectory;
use crate::domain::{Coordinate, Identity, ProfessionalId, UserId};
use crate::error::RelayResult;
use crate::location::LocationStore;
use crate::protocol::OutboundMessage;
use crate::registry::{ChannelHandle, ConnectionRegistry};

/// Outcome of one broadcast cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Whether the directory knew the reporting professional
    pub professional_known: bool,
    /// Distinct customers authorized to track the professional
    pub authorized: usize,
    /// Customers whose channel accepted the frame
    pub delivered: usize,
}

/// Location fan-out over explicitly owned directory and registry state.
#[derive(Clone)]
pub struct BroadcastEngine {
    directory: SharedDirectory,
    registry: ConnectionRegistry,
    locations: LocationStore,
}

impl BroadcastEngine {
    /// Create an engine over a directory and a connection registry.
    #[must_use]
    pub fn new(directory: SharedDirectory, registry: ConnectionRegistry) -> Self {
        let locations = LocationStore::new(directory.clone());
        Self {
            directory,
            registry,
            locations,
        }
    }

    /// Registry of live channels.
    #[must_use]
    pub const fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Booking directory in use.
    #[must_use]
    pub const fn directory(&self) -> &SharedDirectory {
        &self.directory
    }

    /// Location store over the directory.
    #[must_use]
    pub const fn locations(&self) -> &LocationStore {
        &self.locations
    }

    /// Record a professional's new coordinate and push it to every
    /// authorized, connected customer.
    ///
    /// The fan-out does not depend on the professional having a directory
    /// record: bookings alone authorize recipients. An unknown professional
    /// is reported with `professional_known = false`.
    ///
    /// # Errors
    ///
    /// Returns a directory error if the location write or booking lookup
    /// fails; in that case nothing has been pushed.
    #[instrument(skip(self), fields(lat = coordinate.latitude, lon = coordinate.longitude))]
    pub async fn on_professional_location_update(
        &self,
        professional_id: ProfessionalId,
        coordinate: Coordinate,
    ) -> RelayResult<BroadcastReport> {
        let professional_known = self.locations.record(professional_id, coordinate).await?;
        if !professional_known {
            debug!("Location reported for unknown professional, nothing stored");
        }

        let recipients = self.authorized_recipients(professional_id).await?;

        let mut handles = Vec::with_capacity(recipients.len());
        for user_id in &recipients {
            if let Some(handle) = self.registry.resolve(Identity::Customer(*user_id)).await {
                handles.push((*user_id, handle));
            }
        }

        let message = OutboundMessage::ProfessionalLocation {
            professional_id,
            data: coordinate,
        };

        let mut delivered = 0;
        for (user_id, handle) in handles {
            if handle.is_open() && handle.send(message.clone()) {
                delivered += 1;
            } else {
                debug!(user_id, channel = handle.id(), "Skipping closed customer channel");
            }
        }

        debug!(
            authorized = recipients.len(),
            delivered, "Location broadcast complete"
        );

        Ok(BroadcastReport {
            professional_known,
            authorized: recipients.len(),
            delivered,
        })
    }

    /// Customers currently authorized to track `professional_id`.
    ///
    /// # Errors
    ///
    /// Returns a directory error if the booking lookup fails.
    pub async fn authorized_recipients(
        &self,
        professional_id: ProfessionalId,
    ) -> RelayResult<BTreeSet<UserId>> {
        Ok(self
            .directory
            .bookings_for_professional(professional_id)
            .await?
            .into_iter()
            .filter(|booking| booking.status.is_trackable())
            .map(|booking| booking.user_id)
            .collect())
    }

    /// Push a professional's own last stored coordinate back to them.
    ///
    /// Returns the number of frames queued (0 or 1).
    ///
    /// # Errors
    ///
    /// Returns a directory error if the lookup fails.
    pub async fn replay_for_professional(
        &self,
        professional_id: ProfessionalId,
        handle: &ChannelHandle,
    ) -> RelayResult<usize> {
        let Some(coordinate) = self.locations.last_known(professional_id).await? else {
            return Ok(0);
        };

        Ok(usize::from(handle.send(OutboundMessage::Location { data: coordinate })))
    }

    /// Push the current coordinate of every professional the customer is
    /// authorized to track.
    ///
    /// Returns the number of frames queued.
    ///
    /// # Errors
    ///
    /// Returns a directory error if a lookup fails. Frames queued before the
    /// failure stay queued.
    pub async fn replay_for_customer(
        &self,
        user_id: UserId,
        handle: &ChannelHandle,
    ) -> RelayResult<usize> {
        let tracked: BTreeSet<ProfessionalId> = self
            .directory
            .bookings_for_user(user_id)
            .await?
            .into_iter()
            .filter(|booking| booking.status.is_trackable())
            .map(|booking| booking.professional_id)
            .collect();

        let mut sent = 0;
        for professional_id in tracked {
            if let Some(coordinate) = self.locations.last_known(professional_id).await? {
                let message = OutboundMessage::ProfessionalLocation {
                    professional_id,
                    data: coordinate,
                };
                if handle.send(message) {
                    sent += 1;
                }
            }
        }

        Ok(sent)
    }
}
