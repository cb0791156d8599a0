//! API error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::{DetectionFailure, RouteError};

/// Errors surfaced to API clients as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Detection(#[from] DetectionFailure),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Route(e) => match e {
                RouteError::Unavailable(_) => StatusCode::NOT_FOUND,
                RouteError::TooLong { .. } | RouteError::Geocode(_) => StatusCode::BAD_REQUEST,
                RouteError::MissingApiKey(_) => StatusCode::SERVICE_UNAVAILABLE,
                RouteError::Transport(_) | RouteError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            },
            ApiError::Detection(DetectionFailure::MissingApiKey(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Detection(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
