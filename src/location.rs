//! Last-known coordinate per professional.
//!
//! The coordinate lives on the professional record owned by the booking
//! directory, so the store is a narrow view over the directory's location
//! read and write paths. Writes are last-write-wins with no sequencing: a
//! stale report arriving after a fresher one overwrites it.

use tracing::debug;

use crate::directory::SharedDirectory;
use crate::domain::{Coordinate, ProfessionalId};
use crate::error::RelayResult;

/// View of the directory restricted to professional locations.
#[derive(Clone)]
pub struct LocationStore {
    directory: SharedDirectory,
}

impl LocationStore {
    /// Create a store over the given directory.
    #[must_use]
    pub fn new(directory: SharedDirectory) -> Self {
        Self { directory }
    }

    /// Overwrite the professional's current coordinate.
    ///
    /// Returns `false` if the directory does not know the professional.
    pub async fn record(
        &self,
        professional_id: ProfessionalId,
        coordinate: Coordinate,
    ) -> RelayResult<bool> {
        let updated = self
            .directory
            .update_professional_location(
                professional_id,
                coordinate.latitude,
                coordinate.longitude,
            )
            .await?;

        debug!(
            professional_id,
            latitude = coordinate.latitude,
            longitude = coordinate.longitude,
            known = updated.is_some(),
            "Location recorded"
        );

        Ok(updated.is_some())
    }

    /// Last coordinate reported by the professional, if any.
    pub async fn last_known(
        &self,
        professional_id: ProfessionalId,
    ) -> RelayResult<Option<Coordinate>> {
        Ok(self
            .directory
            .professional(professional_id)
            .await?
            .and_then(|record| record.location()))
    }
}
