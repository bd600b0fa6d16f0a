//! Zone — a physical enclosure housing animals, with capacity and occupancy.
//!
//! Zones are read-mostly reference data for the feeding core: schedules
//! target a zone, but the core never changes occupancy.

use serde::{Deserialize, Serialize};

use crate::error::{FeedlotError, ValidationError};
use crate::id::ZoneId;

/// A physical enclosure or area (pen, coop, paddock, pond).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub capacity: u32,
    pub current_occupancy: u32,
    /// Free-form zone category ("poultry", "cattle", …).
    pub kind: String,
}

impl Zone {
    /// Create a builder for constructing a [`Zone`].
    #[must_use]
    pub fn builder() -> ZoneBuilder {
        ZoneBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`FeedlotError::Validation`] when `name` is empty,
    /// `capacity` is zero, or occupancy exceeds capacity.
    pub fn validate(&self) -> Result<(), FeedlotError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.capacity == 0 {
            return Err(ValidationError::NonPositiveCapacity.into());
        }
        if self.current_occupancy > self.capacity {
            return Err(ValidationError::OccupancyExceedsCapacity {
                occupancy: self.current_occupancy,
                capacity: self.capacity,
            }
            .into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Zone`].
#[derive(Debug, Default)]
pub struct ZoneBuilder {
    id: Option<ZoneId>,
    name: Option<String>,
    capacity: Option<u32>,
    current_occupancy: Option<u32>,
    kind: Option<String>,
}

impl ZoneBuilder {
    #[must_use]
    pub fn id(mut self, id: ZoneId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    #[must_use]
    pub fn current_occupancy(mut self, occupancy: u32) -> Self {
        self.current_occupancy = Some(occupancy);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Consume the builder, validate, and return a [`Zone`].
    ///
    /// # Errors
    ///
    /// Returns [`FeedlotError::Validation`] if invariants fail.
    pub fn build(self) -> Result<Zone, FeedlotError> {
        let zone = Zone {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            capacity: self.capacity.unwrap_or_default(),
            current_occupancy: self.current_occupancy.unwrap_or_default(),
            kind: self.kind.unwrap_or_else(|| "general".to_string()),
        };
        zone.validate()?;
        Ok(zone)
    }
}
