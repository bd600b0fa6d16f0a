//! `SQLite` implementation of the append-only [`HistoryStore`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use feedlot_app::ports::HistoryStore;
use feedlot_domain::error::FeedlotError;
use feedlot_domain::feeding_event::{FeedingEvent, FeedingOutcome};
use feedlot_domain::id::{FeedTypeId, FeedingEventId, ScheduleId};

use crate::error::StorageError;

struct Wrapper(FeedingEvent);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let schedule_id: uuid::Uuid = row.try_get("schedule_id")?;
        let feed_id: uuid::Uuid = row.try_get("feed_id")?;
        let quantity: f64 = row.try_get("quantity")?;
        let outcome: String = row.try_get("outcome")?;
        let started_at_str: String = row.try_get("started_at")?;
        let completed_at_str: String = row.try_get("completed_at")?;
        let notes: Option<String> = row.try_get("notes")?;

        let outcome =
            FeedingOutcome::from_str(&outcome).map_err(|err| sqlx::Error::Decode(err.into()))?;
        let started_at = chrono::DateTime::parse_from_rfc3339(&started_at_str)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();
        let completed_at = chrono::DateTime::parse_from_rfc3339(&completed_at_str)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();

        Ok(Self(FeedingEvent {
            id: FeedingEventId::from_uuid(id),
            schedule_id: ScheduleId::from_uuid(schedule_id),
            feed_id: FeedTypeId::from_uuid(feed_id),
            quantity,
            outcome,
            started_at,
            completed_at,
            notes,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO feeding_events (id, schedule_id, feed_id, quantity, outcome, started_at, completed_at, notes)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
";
const SELECT_RECENT: &str = "SELECT * FROM feeding_events ORDER BY completed_at DESC LIMIT ?";
const SELECT_BY_SCHEDULE: &str =
    "SELECT * FROM feeding_events WHERE schedule_id = ? ORDER BY completed_at DESC LIMIT ?";

/// `SQLite`-backed feeding history store. Append-only: rows are never
/// updated or deleted.
#[derive(Clone)]
pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

impl SqliteHistoryStore {
    /// Create a new history store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl HistoryStore for SqliteHistoryStore {
    async fn record(&self, event: FeedingEvent) -> Result<FeedingEvent, FeedlotError> {
        sqlx::query(INSERT)
            .bind(event.id.as_uuid())
            .bind(event.schedule_id.as_uuid())
            .bind(event.feed_id.as_uuid())
            .bind(event.quantity)
            .bind(event.outcome.as_str())
            .bind(event.started_at.to_rfc3339())
            .bind(event.completed_at.to_rfc3339())
            .bind(&event.notes)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(event)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<FeedingEvent>, FeedlotError> {
        let limit = i32::try_from(limit).unwrap_or(i32::MAX);
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_RECENT)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn find_by_schedule(
        &self,
        schedule_id: ScheduleId,
        limit: usize,
    ) -> Result<Vec<FeedingEvent>, FeedlotError> {
        let limit = i32::try_from(limit).unwrap_or(i32::MAX);
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_SCHEDULE)
            .bind(schedule_id.as_uuid())
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;

    async fn setup() -> SqliteHistoryStore {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteHistoryStore::new(db.pool().clone())
    }

    fn delivered(schedule_id: ScheduleId, completed_at: chrono::DateTime<chrono::Utc>) -> FeedingEvent {
        FeedingEvent::builder()
            .schedule_id(schedule_id)
            .feed_id(FeedTypeId::new())
            .quantity(5.0)
            .outcome(FeedingOutcome::Delivered)
            .completed_at(completed_at)
            .build()
    }

    #[tokio::test]
    async fn should_record_and_list_event() {
        let store = setup().await;
        let event = delivered(ScheduleId::new(), chrono::Utc::now());
        let id = event.id;

        store.record(event).await.unwrap();

        let recent = store.list_recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, id);
        assert_eq!(recent[0].outcome, FeedingOutcome::Delivered);
    }

    #[tokio::test]
    async fn should_list_recent_newest_first() {
        let store = setup().await;
        let now = chrono::Utc::now();
        let older = delivered(ScheduleId::new(), now - chrono::Duration::hours(1));
        let newer = delivered(ScheduleId::new(), now);
        let newer_id = newer.id;

        store.record(older).await.unwrap();
        store.record(newer).await.unwrap();

        let recent = store.list_recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, newer_id);
    }

    #[tokio::test]
    async fn should_respect_limit_on_list_recent() {
        let store = setup().await;
        for i in 0..5 {
            store
                .record(delivered(
                    ScheduleId::new(),
                    chrono::Utc::now() - chrono::Duration::minutes(i),
                ))
                .await
                .unwrap();
        }

        let recent = store.list_recent(3).await.unwrap();
        assert_eq!(recent.len(), 3);
    }

    #[tokio::test]
    async fn should_find_events_by_schedule() {
        let store = setup().await;
        let schedule_id = ScheduleId::new();

        store
            .record(delivered(schedule_id, chrono::Utc::now()))
            .await
            .unwrap();
        store
            .record(delivered(schedule_id, chrono::Utc::now()))
            .await
            .unwrap();
        store
            .record(delivered(ScheduleId::new(), chrono::Utc::now()))
            .await
            .unwrap();

        let by_schedule = store.find_by_schedule(schedule_id, 10).await.unwrap();
        assert_eq!(by_schedule.len(), 2);

        let other = store.find_by_schedule(ScheduleId::new(), 10).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn should_preserve_timed_out_notes_through_roundtrip() {
        let store = setup().await;
        let event = FeedingEvent::builder()
            .schedule_id(ScheduleId::new())
            .feed_id(FeedTypeId::new())
            .quantity(3.0)
            .outcome(FeedingOutcome::TimedOut)
            .notes("target weight not confirmed within 60s")
            .build();
        let id = event.id;

        store.record(event).await.unwrap();

        let recent = store.list_recent(1).await.unwrap();
        assert_eq!(recent[0].id, id);
        assert_eq!(
            recent[0].notes.as_deref(),
            Some("target weight not confirmed within 60s")
        );
    }
}
