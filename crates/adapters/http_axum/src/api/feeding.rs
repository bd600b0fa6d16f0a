//! JSON REST handlers for feeding schedules and the feeding history.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use feedlot_app::ports::{
    FeedTypeRepository, FeederTransport, HistoryStore, ScheduleRepository, ZoneRepository,
};
use feedlot_app::services::{CreateScheduleRequest, CreatedSchedule};
use feedlot_domain::error::{FeedlotError, ValidationError};
use feedlot_domain::feeding_event::FeedingEvent;
use feedlot_domain::id::{FeedTypeId, ScheduleId, ZoneId};
use feedlot_domain::schedule::FeedingSchedule;
use feedlot_domain::time::Timestamp;

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Request body for creating a feeding schedule.
#[derive(Deserialize)]
pub struct CreateFeedingRequest {
    pub zone_id: String,
    pub feed_id: String,
    pub quantity: f64,
    pub feeding_times: Vec<Timestamp>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub immediate: bool,
}

/// Query parameters for the history endpoint.
#[derive(Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub schedule_id: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<CreatedSchedule>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<FeedingSchedule>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<FeedingSchedule>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the cancel endpoint.
pub enum CancelResponse {
    NoContent,
}

impl IntoResponse for CancelResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// Possible responses from the history endpoint.
pub enum HistoryResponse {
    Ok(Json<Vec<FeedingEvent>>),
}

impl IntoResponse for HistoryResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

fn malformed(id: &str) -> ApiError {
    ApiError::from(FeedlotError::Validation(ValidationError::MalformedId(
        id.to_owned(),
    )))
}

/// `POST /api/feeding`
pub async fn create<T, R, S, H, Z>(
    State(state): State<AppState<T, R, S, H, Z>>,
    Json(req): Json<CreateFeedingRequest>,
) -> Result<CreateResponse, ApiError>
where
    T: FeederTransport + Send + Sync + 'static,
    R: FeedTypeRepository + Send + Sync + 'static,
    S: ScheduleRepository + Clone + Send + Sync + 'static,
    H: HistoryStore + Clone + Send + Sync + 'static,
    Z: ZoneRepository + Send + Sync + 'static,
{
    let zone_id = ZoneId::from_str(&req.zone_id).map_err(|_| malformed(&req.zone_id))?;
    let feed_id = FeedTypeId::from_str(&req.feed_id).map_err(|_| malformed(&req.feed_id))?;

    let created = state
        .schedule_service
        .create(CreateScheduleRequest {
            zone_id,
            feed_id,
            quantity: req.quantity,
            feeding_times: req.feeding_times,
            notes: req.notes,
            immediate: req.immediate,
        })
        .await?;

    Ok(CreateResponse::Created(Json(created)))
}

/// `GET /api/feeding`
pub async fn list<T, R, S, H, Z>(
    State(state): State<AppState<T, R, S, H, Z>>,
) -> Result<ListResponse, ApiError>
where
    T: FeederTransport + Send + Sync + 'static,
    R: FeedTypeRepository + Send + Sync + 'static,
    S: ScheduleRepository + Clone + Send + Sync + 'static,
    H: HistoryStore + Clone + Send + Sync + 'static,
    Z: ZoneRepository + Send + Sync + 'static,
{
    let schedules = state.schedule_service.list().await?;
    Ok(ListResponse::Ok(Json(schedules)))
}

/// `GET /api/feeding/{id}`
pub async fn get<T, R, S, H, Z>(
    State(state): State<AppState<T, R, S, H, Z>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    T: FeederTransport + Send + Sync + 'static,
    R: FeedTypeRepository + Send + Sync + 'static,
    S: ScheduleRepository + Clone + Send + Sync + 'static,
    H: HistoryStore + Clone + Send + Sync + 'static,
    Z: ZoneRepository + Send + Sync + 'static,
{
    let schedule_id = ScheduleId::from_str(&id).map_err(|_| malformed(&id))?;
    let schedule = state.schedule_service.get(schedule_id).await?;
    Ok(GetResponse::Ok(Json(schedule)))
}

/// `DELETE /api/feeding/{id}`
pub async fn cancel<T, R, S, H, Z>(
    State(state): State<AppState<T, R, S, H, Z>>,
    Path(id): Path<String>,
) -> Result<CancelResponse, ApiError>
where
    T: FeederTransport + Send + Sync + 'static,
    R: FeedTypeRepository + Send + Sync + 'static,
    S: ScheduleRepository + Clone + Send + Sync + 'static,
    H: HistoryStore + Clone + Send + Sync + 'static,
    Z: ZoneRepository + Send + Sync + 'static,
{
    let schedule_id = ScheduleId::from_str(&id).map_err(|_| malformed(&id))?;
    state.schedule_service.cancel(schedule_id).await?;
    Ok(CancelResponse::NoContent)
}

/// `GET /api/feeding/history`
pub async fn history<T, R, S, H, Z>(
    State(state): State<AppState<T, R, S, H, Z>>,
    Query(query): Query<HistoryQuery>,
) -> Result<HistoryResponse, ApiError>
where
    T: FeederTransport + Send + Sync + 'static,
    R: FeedTypeRepository + Send + Sync + 'static,
    S: ScheduleRepository + Clone + Send + Sync + 'static,
    H: HistoryStore + Clone + Send + Sync + 'static,
    Z: ZoneRepository + Send + Sync + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let events = match query.schedule_id {
        Some(raw) => {
            let schedule_id = ScheduleId::from_str(&raw).map_err(|_| malformed(&raw))?;
            state.history.find_by_schedule(schedule_id, limit).await?
        }
        None => state.history.list_recent(limit).await?,
    };
    Ok(HistoryResponse::Ok(Json(events)))
}
