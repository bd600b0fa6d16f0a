//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use feedlot_domain::error::FeedlotError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`FeedlotError`] to an HTTP response with appropriate status code.
pub struct ApiError(FeedlotError);

impl From<FeedlotError> for ApiError {
    fn from(err: FeedlotError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            FeedlotError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            FeedlotError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            FeedlotError::InsufficientStock(err) => (StatusCode::CONFLICT, err.to_string()),
            FeedlotError::Conflict(err) => (StatusCode::CONFLICT, err.to_string()),
            FeedlotError::DeviceUnreachable(err) => (StatusCode::BAD_GATEWAY, err.to_string()),
            FeedlotError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
