//! History port — append-only persistence for feeding audit records.

use std::future::Future;

use feedlot_domain::error::FeedlotError;
use feedlot_domain::feeding_event::FeedingEvent;
use feedlot_domain::id::ScheduleId;

/// Append-only store of [`FeedingEvent`]s. Past events are never mutated.
pub trait HistoryStore {
    /// Append a feeding event.
    fn record(
        &self,
        event: FeedingEvent,
    ) -> impl Future<Output = Result<FeedingEvent, FeedlotError>> + Send;

    /// The most recent events, ordered newest-first.
    fn list_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<FeedingEvent>, FeedlotError>> + Send;

    /// Events for one schedule, ordered newest-first.
    fn find_by_schedule(
        &self,
        schedule_id: ScheduleId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<FeedingEvent>, FeedlotError>> + Send;
}
