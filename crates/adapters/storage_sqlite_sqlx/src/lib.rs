//! # feedlot-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `feedlot-app::ports::storage`
//! - Implement the append-only `HistoryStore`
//! - Manage the `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `feedlot-app` (for port traits) and `feedlot-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod feed_type_repo;
pub mod history_store;
pub mod pool;
pub mod schedule_repo;
pub mod zone_repo;

pub use error::StorageError;
pub use feed_type_repo::SqliteFeedTypeRepository;
pub use history_store::SqliteHistoryStore;
pub use pool::{Config, Database};
pub use schedule_repo::SqliteScheduleRepository;
pub use zone_repo::SqliteZoneRepository;
