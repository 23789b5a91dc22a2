//! HTTP mapping of pipeline errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::DataError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Pipeline error surfaced to the dashboard
    #[error(transparent)]
    Data(#[from] DataError),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Background load task failed to complete
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::Data(DataError::EmptyResult(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_RESULT")
            }
            ApiError::Data(DataError::Directory { .. }) => {
                (StatusCode::SERVICE_UNAVAILABLE, "DATA_DIR_UNREADABLE")
            }
            ApiError::Data(DataError::Mapping(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "MAPPING_ERROR")
            }
            ApiError::Data(DataError::AggregationUndefined(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "AGGREGATION_UNDEFINED")
            }
            ApiError::Data(DataError::Export(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_ERROR")
            }
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
