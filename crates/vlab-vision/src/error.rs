//! Vision client error types.

use thiserror::Error;
use vlab_gcp_auth::AuthError;

pub type VisionResult<T> = Result<T, VisionError>;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Vision service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Error reported for the image itself (unreadable URI, bad format, ...).
    #[error("Annotation failed with code {code}: {message}")]
    Annotation { code: i32, message: String },

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VisionError {
    /// Map a non-success HTTP status to an error.
    pub fn from_http_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            429 => VisionError::RateLimited(body),
            500..=599 => VisionError::ServiceUnavailable(format!("HTTP {}: {}", status, body)),
            _ => VisionError::RequestFailed(format!("HTTP {}: {}", status, body)),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VisionError::ServiceUnavailable(_) | VisionError::RateLimited(_) | VisionError::Network(_)
        )
    }

    /// HTTP-like status for metrics labels.
    pub fn http_status(&self) -> u16 {
        match self {
            VisionError::RateLimited(_) => 429,
            VisionError::ServiceUnavailable(_) => 503,
            VisionError::RequestFailed(_) | VisionError::Annotation { .. } => 400,
            VisionError::Auth(_) => 401,
            _ => 500,
        }
    }
}
