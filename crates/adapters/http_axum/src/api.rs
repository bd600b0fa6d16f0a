//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod device;
#[allow(clippy::missing_errors_doc)]
pub mod feed_types;
#[allow(clippy::missing_errors_doc)]
pub mod feeding;
pub mod sse;
#[allow(clippy::missing_errors_doc)]
pub mod zones;

use axum::Router;
use axum::routing::{get, post};

use feedlot_app::ports::{
    FeedTypeRepository, FeederTransport, HistoryStore, ScheduleRepository, ZoneRepository,
};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<T, R, S, H, Z>() -> Router<AppState<T, R, S, H, Z>>
where
    T: FeederTransport + Send + Sync + 'static,
    R: FeedTypeRepository + Send + Sync + 'static,
    S: ScheduleRepository + Clone + Send + Sync + 'static,
    H: HistoryStore + Clone + Send + Sync + 'static,
    Z: ZoneRepository + Send + Sync + 'static,
{
    Router::new()
        // Feeding schedules
        .route(
            "/feeding",
            get(feeding::list::<T, R, S, H, Z>).post(feeding::create::<T, R, S, H, Z>),
        )
        .route("/feeding/history", get(feeding::history::<T, R, S, H, Z>))
        .route(
            "/feeding/{id}",
            get(feeding::get::<T, R, S, H, Z>).delete(feeding::cancel::<T, R, S, H, Z>),
        )
        // Device connectivity
        .route(
            "/device/test-connection",
            post(device::test_connection::<T, R, S, H, Z>),
        )
        .route("/device/status", get(device::status::<T, R, S, H, Z>))
        // Feed types
        .route(
            "/feed-types",
            get(feed_types::list::<T, R, S, H, Z>).post(feed_types::create::<T, R, S, H, Z>),
        )
        .route(
            "/feed-types/{id}",
            get(feed_types::get::<T, R, S, H, Z>).delete(feed_types::delete::<T, R, S, H, Z>),
        )
        // Zones
        .route(
            "/zones",
            get(zones::list::<T, R, S, H, Z>).post(zones::create::<T, R, S, H, Z>),
        )
        .route("/zones/{id}", get(zones::get::<T, R, S, H, Z>))
        // Lifecycle events
        .route("/events/stream", get(sse::stream::<T, R, S, H, Z>))
}
