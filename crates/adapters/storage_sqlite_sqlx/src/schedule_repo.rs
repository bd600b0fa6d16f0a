//! `SQLite` implementation of [`ScheduleRepository`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use feedlot_app::ports::ScheduleRepository;
use feedlot_domain::error::FeedlotError;
use feedlot_domain::id::{FeedTypeId, ScheduleId, ZoneId};
use feedlot_domain::schedule::{FeedingSchedule, ScheduleStatus};
use feedlot_domain::time::Timestamp;

use crate::error::StorageError;

struct Wrapper(FeedingSchedule);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<FeedingSchedule> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let zone_id: uuid::Uuid = row.try_get("zone_id")?;
        let feed_id: uuid::Uuid = row.try_get("feed_id")?;
        let quantity: f64 = row.try_get("quantity")?;
        let feeding_times_json: String = row.try_get("feeding_times")?;
        let notes: Option<String> = row.try_get("notes")?;
        let immediate: bool = row.try_get("immediate")?;
        let status: String = row.try_get("status")?;
        let created_at_str: String = row.try_get("created_at")?;

        let feeding_times: Vec<Timestamp> = serde_json::from_str(&feeding_times_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let status = ScheduleStatus::from_str(&status)
            .map_err(|err| sqlx::Error::Decode(err.into()))?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();

        Ok(Self(FeedingSchedule {
            id: ScheduleId::from_uuid(id),
            zone_id: ZoneId::from_uuid(zone_id),
            feed_id: FeedTypeId::from_uuid(feed_id),
            quantity,
            feeding_times,
            notes,
            immediate,
            status,
            created_at,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO schedules (id, zone_id, feed_id, quantity, feeding_times, notes, immediate, status, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
";
const SELECT_BY_ID: &str = "SELECT * FROM schedules WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM schedules ORDER BY created_at DESC";
const UPDATE_STATUS: &str = "UPDATE schedules SET status = ? WHERE id = ?";
const COUNT_ACTIVE_BY_FEED: &str = r"
    SELECT COUNT(*) FROM schedules
    WHERE feed_id = ? AND status IN ('scheduled', 'dispatched')
";

/// `SQLite`-backed schedule repository.
#[derive(Clone)]
pub struct SqliteScheduleRepository {
    pool: SqlitePool,
}

impl SqliteScheduleRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ScheduleRepository for SqliteScheduleRepository {
    async fn create(&self, schedule: FeedingSchedule) -> Result<FeedingSchedule, FeedlotError> {
        let feeding_times_json =
            serde_json::to_string(&schedule.feeding_times).map_err(StorageError::from)?;

        sqlx::query(INSERT)
            .bind(schedule.id.as_uuid())
            .bind(schedule.zone_id.as_uuid())
            .bind(schedule.feed_id.as_uuid())
            .bind(schedule.quantity)
            .bind(&feeding_times_json)
            .bind(&schedule.notes)
            .bind(schedule.immediate)
            .bind(schedule.status.as_str())
            .bind(schedule.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(schedule)
    }

    async fn get_by_id(&self, id: ScheduleId) -> Result<Option<FeedingSchedule>, FeedlotError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<FeedingSchedule>, FeedlotError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update_status(
        &self,
        id: ScheduleId,
        status: ScheduleStatus,
    ) -> Result<(), FeedlotError> {
        sqlx::query(UPDATE_STATUS)
            .bind(status.as_str())
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }

    async fn count_active_by_feed(&self, feed_id: FeedTypeId) -> Result<u64, FeedlotError> {
        let (count,): (i64,) = sqlx::query_as(COUNT_ACTIVE_BY_FEED)
            .bind(feed_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}
