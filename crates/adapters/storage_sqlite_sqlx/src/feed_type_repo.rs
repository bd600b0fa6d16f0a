//! `SQLite` implementation of [`FeedTypeRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use feedlot_app::ports::FeedTypeRepository;
use feedlot_domain::error::FeedlotError;
use feedlot_domain::feed_type::FeedType;
use feedlot_domain::id::FeedTypeId;

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`FeedType`].
struct Wrapper(FeedType);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<FeedType> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let unit: String = row.try_get("unit")?;
        let total_quantity: f64 = row.try_get("total_quantity")?;
        let remaining_quantity: f64 = row.try_get("remaining_quantity")?;

        Ok(Self(FeedType {
            id: FeedTypeId::from_uuid(id),
            name,
            unit,
            total_quantity,
            remaining_quantity,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO feed_types (id, name, unit, total_quantity, remaining_quantity)
    VALUES (?, ?, ?, ?, ?)
";
const SELECT_BY_ID: &str = "SELECT * FROM feed_types WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM feed_types ORDER BY name";
const UPDATE: &str = r"
    UPDATE feed_types
    SET name = ?, unit = ?, total_quantity = ?, remaining_quantity = ?
    WHERE id = ?
";
const DELETE_BY_ID: &str = "DELETE FROM feed_types WHERE id = ?";

/// `SQLite`-backed feed type repository.
#[derive(Clone)]
pub struct SqliteFeedTypeRepository {
    pool: SqlitePool,
}

impl SqliteFeedTypeRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl FeedTypeRepository for SqliteFeedTypeRepository {
    async fn create(&self, feed: FeedType) -> Result<FeedType, FeedlotError> {
        sqlx::query(INSERT)
            .bind(feed.id.as_uuid())
            .bind(&feed.name)
            .bind(&feed.unit)
            .bind(feed.total_quantity)
            .bind(feed.remaining_quantity)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(feed)
    }

    async fn get_by_id(&self, id: FeedTypeId) -> Result<Option<FeedType>, FeedlotError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<FeedType>, FeedlotError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update(&self, feed: FeedType) -> Result<FeedType, FeedlotError> {
        sqlx::query(UPDATE)
            .bind(&feed.name)
            .bind(&feed.unit)
            .bind(feed.total_quantity)
            .bind(feed.remaining_quantity)
            .bind(feed.id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(feed)
    }

    async fn delete(&self, id: FeedTypeId) -> Result<(), FeedlotError> {
        sqlx::query(DELETE_BY_ID)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }
}
