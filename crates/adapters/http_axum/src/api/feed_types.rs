//! Feed type reference data handlers.

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
use feedlot_domain::feed_type::FeedType;
use feedlot_domain::id::FeedTypeId;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for registering a feed type.
#[derive(Deserialize)]
pub struct CreateFeedTypeRequest {
    pub name: String,
    pub unit: String,
    pub total_quantity: f64,
    #[serde(default)]
    pub remaining_quantity: Option<f64>,
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<FeedType>),
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
    Ok(Json<Vec<FeedType>>),
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
    Ok(Json<FeedType>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

fn malformed(id: &str) -> ApiError {
    ApiError::from(FeedlotError::Validation(ValidationError::MalformedId(
        id.to_owned(),
    )))
}

/// `POST /api/feed-types`
pub async fn create<T, R, S, H, Z>(
    State(state): State<AppState<T, R, S, H, Z>>,
    Json(req): Json<CreateFeedTypeRequest>,
) -> Result<CreateResponse, ApiError>
where
    T: FeederTransport + Send + Sync + 'static,
    R: FeedTypeRepository + Send + Sync + 'static,
    S: ScheduleRepository + Clone + Send + Sync + 'static,
    H: HistoryStore + Clone + Send + Sync + 'static,
    Z: ZoneRepository + Send + Sync + 'static,
{
    let mut builder = FeedType::builder()
        .name(req.name)
        .unit(req.unit)
        .total_quantity(req.total_quantity);
    if let Some(remaining) = req.remaining_quantity {
        builder = builder.remaining_quantity(remaining);
    }
    let feed = builder.build()?;

    let created = state.feed_type_service.create(feed).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `GET /api/feed-types`
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
    let feeds = state.feed_type_service.list().await?;
    Ok(ListResponse::Ok(Json(feeds)))
}

/// `GET /api/feed-types/{id}`
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
    let feed_id = FeedTypeId::from_str(&id).map_err(|_| malformed(&id))?;
    let feed = state.feed_type_service.get(feed_id).await?;
    Ok(GetResponse::Ok(Json(feed)))
}

/// `DELETE /api/feed-types/{id}`
pub async fn delete<T, R, S, H, Z>(
    State(state): State<AppState<T, R, S, H, Z>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    T: FeederTransport + Send + Sync + 'static,
    R: FeedTypeRepository + Send + Sync + 'static,
    S: ScheduleRepository + Clone + Send + Sync + 'static,
    H: HistoryStore + Clone + Send + Sync + 'static,
    Z: ZoneRepository + Send + Sync + 'static,
{
    let feed_id = FeedTypeId::from_str(&id).map_err(|_| malformed(&id))?;
    state.feed_type_service.delete(feed_id).await?;
    Ok(DeleteResponse::NoContent)
}
