//! Where a results document is read from.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use vlab_models::{DetectionRecord, DetectionResults, StorageEvent};
use vlab_storage::{load_results, ObjectStore};

/// A local file, or `gs://bucket/key` fetched through the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsSource {
    Local(PathBuf),
    Remote(StorageEvent),
}

impl ResultsSource {
    pub fn parse(value: &str) -> Result<Self> {
        if value.starts_with("gs://") {
            Ok(ResultsSource::Remote(StorageEvent::from_gcs_uri(value)?))
        } else {
            Ok(ResultsSource::Local(PathBuf::from(value)))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ResultsSource::Remote(_))
    }

    /// Read and parse the document. `store` is only used for remote sources.
    pub async fn load<T: DetectionRecord>(&self, store: Option<&dyn ObjectStore>) -> Result<DetectionResults<T>> {
        match self {
            ResultsSource::Local(path) => {
                let raw = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_slice(&raw).with_context(|| format!("Failed to parse {}", path.display()))
            }
            ResultsSource::Remote(object) => {
                let store = store.context("Remote results need an object store")?;
                load_results(store, &object.bucket, &object.name)
                    .await
                    .with_context(|| format!("Failed to load {}", object))
            }
        }
    }
}

impl fmt::Display for ResultsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultsSource::Local(path) => write!(f, "{}", path.display()),
            ResultsSource::Remote(object) => write!(f, "{}", object),
        }
    }
}
