//! Feed type stock reference data.

use feedlot_domain::error::{ConflictError, FeedlotError, NotFoundError};
use feedlot_domain::feed_type::FeedType;
use feedlot_domain::id::FeedTypeId;

use crate::ports::{FeedTypeRepository, ScheduleRepository};

/// Use-cases around [`FeedType`] records.
///
/// Stock *movements* are not handled here; those go through the inventory
/// ledger. This service covers the reference-data CRUD around it.
#[derive(Debug, Clone)]
pub struct FeedTypeService<F, S> {
    feeds: F,
    schedules: S,
}

impl<F, S> FeedTypeService<F, S>
where
    F: FeedTypeRepository,
    S: ScheduleRepository,
{
    pub fn new(feeds: F, schedules: S) -> Self {
        Self { feeds, schedules }
    }

    /// Validate and persist a new feed type.
    ///
    /// # Errors
    ///
    /// Returns [`FeedlotError::Validation`] for an empty name or unit, a
    /// non-positive total, or an out-of-range remaining quantity.
    #[tracing::instrument(skip(self, feed), fields(name = %feed.name))]
    pub async fn create(&self, feed: FeedType) -> Result<FeedType, FeedlotError> {
        feed.validate()?;
        let feed = self.feeds.create(feed).await?;
        tracing::info!(feed = %feed.id, "feed type created");
        Ok(feed)
    }

    /// Fetch one feed type.
    ///
    /// # Errors
    ///
    /// Returns [`FeedlotError::NotFound`] when the id is unknown.
    pub async fn get(&self, id: FeedTypeId) -> Result<FeedType, FeedlotError> {
        self.feeds.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "FeedType",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all feed types.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list(&self) -> Result<Vec<FeedType>, FeedlotError> {
        self.feeds.get_all().await
    }

    /// Delete a feed type that no active schedule references.
    ///
    /// # Errors
    ///
    /// Returns [`FeedlotError::NotFound`] for an unknown id and
    /// [`FeedlotError::Conflict`] while schedules still reference it.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: FeedTypeId) -> Result<(), FeedlotError> {
        self.get(id).await?;
        let count = self.schedules.count_active_by_feed(id).await?;
        if count > 0 {
            return Err(ConflictError::FeedTypeInUse {
                feed_id: id.to_string(),
                count,
            }
            .into());
        }
        self.feeds.delete(id).await?;
        tracing::info!(feed = %id, "feed type deleted");
        Ok(())
    }
}
