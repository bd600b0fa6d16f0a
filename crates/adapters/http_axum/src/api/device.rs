//! Handlers exposing the feeding controller connectivity state.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use feedlot_app::ports::{
    FeedTypeRepository, FeederTransport, HistoryStore, ScheduleRepository, ZoneRepository,
};
use feedlot_domain::device::DeviceConnection;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the connectivity endpoints.
pub enum DeviceResponse {
    Ok(Json<DeviceConnection>),
}

impl IntoResponse for DeviceResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /api/device/test-connection`
///
/// Runs a live probe against the feeder. The outcome is readable from
/// the returned snapshot, so an unreachable feeder is still a 200.
pub async fn test_connection<T, R, S, H, Z>(
    State(state): State<AppState<T, R, S, H, Z>>,
) -> Result<DeviceResponse, ApiError>
where
    T: FeederTransport + Send + Sync + 'static,
    R: FeedTypeRepository + Send + Sync + 'static,
    S: ScheduleRepository + Clone + Send + Sync + 'static,
    H: HistoryStore + Clone + Send + Sync + 'static,
    Z: ZoneRepository + Send + Sync + 'static,
{
    let snapshot = state.device.test_connection().await;
    Ok(DeviceResponse::Ok(Json(snapshot)))
}

/// `GET /api/device/status`
///
/// Returns the last known connection snapshot without touching the wire.
pub async fn status<T, R, S, H, Z>(
    State(state): State<AppState<T, R, S, H, Z>>,
) -> Result<DeviceResponse, ApiError>
where
    T: FeederTransport + Send + Sync + 'static,
    R: FeedTypeRepository + Send + Sync + 'static,
    S: ScheduleRepository + Clone + Send + Sync + 'static,
    H: HistoryStore + Clone + Send + Sync + 'static,
    Z: ZoneRepository + Send + Sync + 'static,
{
    let snapshot = state.device.status().await;
    Ok(DeviceResponse::Ok(Json(snapshot)))
}
