//! Local directory store: `<root>/<bucket>/<key>`.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::metrics::observe;
use crate::store::{ObjectStore, StorageBackend};

/// Filesystem-backed store for development and tests.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root from `LOCAL_STORAGE_ROOT` (default `./storage`).
    pub fn from_env() -> StorageResult<Self> {
        let root = std::env::var("LOCAL_STORAGE_ROOT").unwrap_or_else(|_| "./storage".to_string());
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an object path, rejecting keys that would escape the bucket.
    pub fn object_path(&self, bucket: &str, key: &str) -> StorageResult<PathBuf> {
        check_segment(bucket, "bucket")?;
        if key.is_empty() {
            return Err(StorageError::InvalidKey("empty key".to_string()));
        }

        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.root.join(bucket).join(relative))
    }
}

fn check_segment(value: &str, what: &str) -> StorageResult<()> {
    if value.is_empty() || value.contains('/') || value.contains('\\') || value == "." || value == ".." {
        return Err(StorageError::InvalidKey(format!("invalid {} '{}'", what, value)));
    }
    Ok(())
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put_bytes(&self, bucket: &str, key: &str, data: Vec<u8>, _content_type: &str) -> StorageResult<()> {
        observe(self.backend().as_str(), "put", bucket, key, async {
            let path = self.object_path(bucket, key)?;
            debug!("Writing {} bytes to {}", data.len(), path.display());

            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, &data).await?;
            Ok(())
        })
        .await
    }

    async fn get_bytes(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        observe(self.backend().as_str(), "get", bucket, key, async {
            let path = self.object_path(bucket, key)?;
            debug!("Reading {}", path.display());

            match tokio::fs::read(&path).await {
                Ok(bytes) => Ok(bytes),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    Err(StorageError::not_found(format!("{}/{}", bucket, key)))
                }
                Err(e) => Err(StorageError::Io(e)),
            }
        })
        .await
    }

    async fn check_connectivity(&self, bucket: &str) -> StorageResult<()> {
        observe(self.backend().as_str(), "head_bucket", bucket, "", async {
            check_segment(bucket, "bucket")?;
            let dir = self.root.join(bucket);
            tokio::fs::create_dir_all(&dir).await?;
            Ok(())
        })
        .await
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        store
            .put_bytes("results", "nested/a.jpg.objects.json", b"{}".to_vec(), "application/json")
            .await
            .unwrap();

        assert!(dir.path().join("results/nested/a.jpg.objects.json").exists());
        let bytes = store.get_bytes("results", "nested/a.jpg.objects.json").await.unwrap();
        assert_eq!(bytes, b"{}");
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        let err = store.get_bytes("results", "missing.json").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_rejects_escaping_keys() {
        let store = LocalStore::new("/tmp/vlab");
        assert!(store.object_path("results", "../etc/passwd").is_err());
        assert!(store.object_path("results", "/abs/path").is_err());
        assert!(store.object_path("..", "a.json").is_err());
        assert!(store.object_path("a/b", "a.json").is_err());
        assert!(store.object_path("results", "").is_err());
        assert!(store.object_path("results", "ok/file.json").is_ok());
    }

    #[tokio::test]
    async fn test_check_connectivity_creates_bucket_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        store.check_connectivity("results").await.unwrap();
        assert!(dir.path().join("results").is_dir());
    }
}
