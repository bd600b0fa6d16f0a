//! Zone reference data.

use feedlot_domain::error::{FeedlotError, NotFoundError};
use feedlot_domain::id::ZoneId;
use feedlot_domain::zone::Zone;

use crate::ports::ZoneRepository;

/// Use-cases around feeding [`Zone`]s.
#[derive(Debug, Clone)]
pub struct ZoneService<Z> {
    zones: Z,
}

impl<Z: ZoneRepository> ZoneService<Z> {
    pub fn new(zones: Z) -> Self {
        Self { zones }
    }

    /// Validate and persist a new zone.
    ///
    /// # Errors
    ///
    /// Returns [`FeedlotError::Validation`] for invalid capacity or
    /// occupancy, or a storage error.
    #[tracing::instrument(skip(self, zone), fields(name = %zone.name))]
    pub async fn create(&self, zone: Zone) -> Result<Zone, FeedlotError> {
        zone.validate()?;
        let zone = self.zones.create(zone).await?;
        tracing::info!(zone = %zone.id, "zone created");
        Ok(zone)
    }

    /// Fetch one zone.
    ///
    /// # Errors
    ///
    /// Returns [`FeedlotError::NotFound`] when the id is unknown.
    pub async fn get(&self, id: ZoneId) -> Result<Zone, FeedlotError> {
        self.zones
            .get_by_id(id)
            .await?
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Zone",
                    id: id.to_string(),
                }
                .into()
            })
    }

    /// List all zones.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list(&self) -> Result<Vec<Zone>, FeedlotError> {
        self.zones.get_all().await
    }
}
