//! Zone reference data handlers.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use feedlot_app::ports::{
    FeedTypeRepository, FeederTransport, HistoryStore, ScheduleRepository, ZoneRepository,
};
use feedlot_domain::error::{FeedlotError, ValidationError};
use feedlot_domain::id::ZoneId;
use feedlot_domain::zone::Zone;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for registering a zone.
#[derive(Deserialize)]
pub struct CreateZoneRequest {
    pub name: String,
    pub capacity: u32,
    #[serde(default)]
    pub current_occupancy: Option<u32>,
    #[serde(default)]
    pub kind: Option<String>,
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Zone>),
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
    Ok(Json<Vec<Zone>>),
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
    Ok(Json<Zone>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /api/zones`
pub async fn create<T, R, S, H, Z>(
    State(state): State<AppState<T, R, S, H, Z>>,
    Json(req): Json<CreateZoneRequest>,
) -> Result<CreateResponse, ApiError>
where
    T: FeederTransport + Send + Sync + 'static,
    R: FeedTypeRepository + Send + Sync + 'static,
    S: ScheduleRepository + Clone + Send + Sync + 'static,
    H: HistoryStore + Clone + Send + Sync + 'static,
    Z: ZoneRepository + Send + Sync + 'static,
{
    let mut builder = Zone::builder().name(req.name).capacity(req.capacity);
    if let Some(occupancy) = req.current_occupancy {
        builder = builder.current_occupancy(occupancy);
    }
    if let Some(kind) = req.kind {
        builder = builder.kind(kind);
    }
    let zone = builder.build()?;

    let created = state.zone_service.create(zone).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `GET /api/zones`
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
    let zones = state.zone_service.list().await?;
    Ok(ListResponse::Ok(Json(zones)))
}

/// `GET /api/zones/{id}`
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
    let zone_id = ZoneId::from_str(&id).map_err(|_| {
        ApiError::from(FeedlotError::Validation(ValidationError::MalformedId(
            id.clone(),
        )))
    })?;
    let zone = state.zone_service.get(zone_id).await?;
    Ok(GetResponse::Ok(Json(zone)))
}
