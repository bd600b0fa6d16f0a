//! `SQLite` implementation of [`ZoneRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use feedlot_app::ports::ZoneRepository;
use feedlot_domain::error::FeedlotError;
use feedlot_domain::id::ZoneId;
use feedlot_domain::zone::Zone;

use crate::error::StorageError;

struct Wrapper(Zone);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Zone> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let capacity: u32 = row.try_get("capacity")?;
        let current_occupancy: u32 = row.try_get("current_occupancy")?;
        let kind: String = row.try_get("kind")?;

        Ok(Self(Zone {
            id: ZoneId::from_uuid(id),
            name,
            capacity,
            current_occupancy,
            kind,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO zones (id, name, capacity, current_occupancy, kind)
    VALUES (?, ?, ?, ?, ?)
";
const SELECT_BY_ID: &str = "SELECT * FROM zones WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM zones ORDER BY name";

/// `SQLite`-backed zone repository.
#[derive(Clone)]
pub struct SqliteZoneRepository {
    pool: SqlitePool,
}

impl SqliteZoneRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ZoneRepository for SqliteZoneRepository {
    async fn create(&self, zone: Zone) -> Result<Zone, FeedlotError> {
        sqlx::query(INSERT)
            .bind(zone.id.as_uuid())
            .bind(&zone.name)
            .bind(zone.capacity)
            .bind(zone.current_occupancy)
            .bind(&zone.kind)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(zone)
    }

    async fn get_by_id(&self, id: ZoneId) -> Result<Option<Zone>, FeedlotError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<Zone>, FeedlotError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
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

    async fn setup() -> SqliteZoneRepository {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteZoneRepository::new(db.pool().clone())
    }

    fn coop() -> Zone {
        Zone::builder()
            .name("Coop A")
            .capacity(120)
            .current_occupancy(80)
            .kind("poultry")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_create_and_retrieve_zone() {
        let repo = setup().await;
        let zone = coop();
        let id = zone.id;

        repo.create(zone).await.unwrap();

        let fetched = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Coop A");
        assert_eq!(fetched.capacity, 120);
        assert_eq!(fetched.kind, "poultry");
    }

    #[tokio::test]
    async fn should_return_none_when_zone_not_found() {
        let repo = setup().await;
        let result = repo.get_by_id(ZoneId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn should_list_all_zones() {
        let repo = setup().await;
        repo.create(coop()).await.unwrap();
        repo.create(
            Zone::builder()
                .name("Barn B")
                .capacity(40)
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Barn B");
    }
}
