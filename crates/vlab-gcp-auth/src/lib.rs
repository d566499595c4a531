//! Google Cloud credentials for the vision and storage clients.
//!
//! This crate provides:
//! - Service account / application default credentials via gcp_auth
//! - A token cache with refresh margin and single-flight refresh
//! - A `Credentials` switch between OAuth, API key and static tokens

pub mod credentials;
pub mod error;
pub mod token_cache;

pub use credentials::{create_token_provider, Credentials};
pub use error::{AuthError, AuthResult};
pub use token_cache::{TokenCache, STORAGE_SCOPE, VISION_SCOPE};
