//! Storage ports — repository traits for persistence.

use std::future::Future;

use feedlot_domain::error::FeedlotError;
use feedlot_domain::feed_type::FeedType;
use feedlot_domain::id::{FeedTypeId, ScheduleId, ZoneId};
use feedlot_domain::schedule::{FeedingSchedule, ScheduleStatus};
use feedlot_domain::zone::Zone;

/// Repository for [`FeedType`] stock records.
///
/// `update` is the write path the inventory ledger uses for
/// `remaining_quantity`; the ledger serializes those calls per feed id.
pub trait FeedTypeRepository {
    /// Persist a new feed type.
    fn create(&self, feed: FeedType)
    -> impl Future<Output = Result<FeedType, FeedlotError>> + Send;

    /// Get a feed type by its unique identifier.
    fn get_by_id(
        &self,
        id: FeedTypeId,
    ) -> impl Future<Output = Result<Option<FeedType>, FeedlotError>> + Send;

    /// List all feed types.
    fn get_all(&self) -> impl Future<Output = Result<Vec<FeedType>, FeedlotError>> + Send;

    /// Overwrite an existing feed type.
    fn update(&self, feed: FeedType)
    -> impl Future<Output = Result<FeedType, FeedlotError>> + Send;

    /// Delete a feed type by id.
    fn delete(&self, id: FeedTypeId) -> impl Future<Output = Result<(), FeedlotError>> + Send;
}

/// Repository for [`Zone`] reference data.
pub trait ZoneRepository {
    /// Persist a new zone.
    fn create(&self, zone: Zone) -> impl Future<Output = Result<Zone, FeedlotError>> + Send;

    /// Get a zone by its unique identifier.
    fn get_by_id(
        &self,
        id: ZoneId,
    ) -> impl Future<Output = Result<Option<Zone>, FeedlotError>> + Send;

    /// List all zones.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Zone>, FeedlotError>> + Send;
}

/// Repository for [`FeedingSchedule`] records.
pub trait ScheduleRepository {
    /// Persist a new schedule.
    fn create(
        &self,
        schedule: FeedingSchedule,
    ) -> impl Future<Output = Result<FeedingSchedule, FeedlotError>> + Send;

    /// Get a schedule by its unique identifier.
    fn get_by_id(
        &self,
        id: ScheduleId,
    ) -> impl Future<Output = Result<Option<FeedingSchedule>, FeedlotError>> + Send;

    /// List all schedules, newest first.
    fn get_all(&self) -> impl Future<Output = Result<Vec<FeedingSchedule>, FeedlotError>> + Send;

    /// Transition a schedule to a new status.
    fn update_status(
        &self,
        id: ScheduleId,
        status: ScheduleStatus,
    ) -> impl Future<Output = Result<(), FeedlotError>> + Send;

    /// Count schedules referencing `feed_id` that are not yet terminal
    /// (status `Scheduled` or `Dispatched`).
    fn count_active_by_feed(
        &self,
        feed_id: FeedTypeId,
    ) -> impl Future<Output = Result<u64, FeedlotError>> + Send;
}
