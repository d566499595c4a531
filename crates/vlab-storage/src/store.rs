//! Storage abstraction and backend selection.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::error::{StorageError, StorageResult};
use crate::gcs::GcsClient;
use crate::local::LocalStore;
use crate::s3::S3Client;

/// Put/get of whole objects addressed by bucket and key.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload `data` as `bucket/key`, replacing any existing object.
    async fn put_bytes(&self, bucket: &str, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()>;

    /// Download `bucket/key`. Missing objects are `StorageError::NotFound`.
    async fn get_bytes(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>>;

    /// Cheap reachability check against a bucket.
    async fn check_connectivity(&self, bucket: &str) -> StorageResult<()>;

    /// Backend name for logs and metrics.
    fn backend(&self) -> StorageBackend;
}

/// Which `ObjectStore` implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Gcs,
    S3,
    Local,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Gcs => "gcs",
            StorageBackend::S3 => "s3",
            StorageBackend::Local => "local",
        }
    }

    /// Read `STORAGE_BACKEND`, defaulting to Cloud Storage.
    pub fn from_env() -> StorageResult<Self> {
        match std::env::var("STORAGE_BACKEND") {
            Ok(value) if !value.trim().is_empty() => value.parse(),
            _ => Ok(StorageBackend::Gcs),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gcs" | "gs" => Ok(StorageBackend::Gcs),
            "s3" => Ok(StorageBackend::S3),
            "local" | "fs" => Ok(StorageBackend::Local),
            other => Err(StorageError::config_error(format!(
                "unknown STORAGE_BACKEND '{}' (expected gcs, s3 or local)",
                other
            ))),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the store selected by `STORAGE_BACKEND`.
pub async fn from_env() -> StorageResult<Arc<dyn ObjectStore>> {
    let backend = StorageBackend::from_env()?;
    info!("Using {} storage backend", backend);

    let store: Arc<dyn ObjectStore> = match backend {
        StorageBackend::Gcs => Arc::new(GcsClient::from_env().await?),
        StorageBackend::S3 => Arc::new(S3Client::from_env().await?),
        StorageBackend::Local => Arc::new(LocalStore::from_env()?),
    };

    Ok(store)
}
