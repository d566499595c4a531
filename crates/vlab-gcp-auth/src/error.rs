//! Authentication error types.

use thiserror::Error;

/// Result type for credential operations.
pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Credentials not configured: {0}")]
    NotConfigured(String),

    #[error("Failed to obtain auth token: {0}")]
    TokenUnavailable(String),
}

impl AuthError {
    pub fn not_configured(msg: impl Into<String>) -> Self {
        Self::NotConfigured(msg.into())
    }

    pub fn token_unavailable(msg: impl Into<String>) -> Self {
        Self::TokenUnavailable(msg.into())
    }
}
