//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use vlab_models::ModelError;
use vlab_storage::StorageError;
use vlab_vision::VisionError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Invalid event: {0}")]
    Model(#[from] ModelError),

    #[error("Vision error: {0}")]
    Vision(#[from] VisionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Model(_) => StatusCode::BAD_REQUEST,
            // The image itself could not be processed (missing object, bad format).
            ApiError::Vision(VisionError::Annotation { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Vision(VisionError::RateLimited(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Vision(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) | ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the message may leak backend details.
    fn is_internal(&self) -> bool {
        match self {
            ApiError::BadRequest(_) | ApiError::Model(_) => false,
            ApiError::Vision(VisionError::Annotation { .. }) => false,
            ApiError::Internal(_) | ApiError::Vision(_) | ApiError::Storage(_) => true,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(status = status.as_u16(), "{}", self);
        }

        // Don't expose internal error details in production
        let detail = if self.is_internal()
            && std::env::var("ENVIRONMENT").unwrap_or_default().to_lowercase() == "production"
        {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let code = match &self {
            ApiError::Vision(VisionError::Annotation { code, .. }) => Some(code.to_string()),
            _ => None,
        };

        (status, Json(ErrorResponse { detail, code })).into_response()
    }
}
