//! Storage error types.

use thiserror::Error;
use vlab_gcp_auth::AuthError;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to configure storage client: {0}")]
    ConfigError(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Storage service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("AWS SDK error: {0}")]
    AwsSdk(String),
}

impl StorageError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound(key.into())
    }

    pub fn upload_failed(msg: impl Into<String>) -> Self {
        Self::UploadFailed(msg.into())
    }

    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::DownloadFailed(msg.into())
    }

    /// Map a non-success HTTP status. `on_client_error` builds the error
    /// for 4xx responses other than 404 and 429.
    pub fn from_http_status(
        status: u16,
        object: &str,
        body: String,
        on_client_error: fn(String) -> StorageError,
    ) -> Self {
        match status {
            404 => StorageError::NotFound(object.to_string()),
            429 => StorageError::RateLimited(body),
            500..=599 => StorageError::ServiceUnavailable(format!("HTTP {}: {}", status, body)),
            _ => on_client_error(format!("{} (HTTP {}): {}", object, status, body)),
        }
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StorageError::Network(_) | StorageError::ServiceUnavailable(_) | StorageError::RateLimited(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }

    /// HTTP-like status for metrics labels.
    pub fn http_status(&self) -> u16 {
        match self {
            StorageError::NotFound(_) => 404,
            StorageError::RateLimited(_) => 429,
            StorageError::ServiceUnavailable(_) => 503,
            StorageError::Auth(_) => 401,
            StorageError::InvalidKey(_) => 400,
            _ => 500,
        }
    }
}
