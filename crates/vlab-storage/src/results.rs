//! Saving and loading detection result documents.

use tracing::info;
use vlab_models::{result_filename, DetectionRecord, DetectionResults};

use crate::error::StorageResult;
use crate::store::ObjectStore;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Upload results as `<original_name><kind extension>` and return the key.
pub async fn save_results<T: DetectionRecord>(
    store: &dyn ObjectStore,
    bucket: &str,
    original_name: &str,
    results: &DetectionResults<T>,
) -> StorageResult<String> {
    let key = result_filename(original_name, T::KIND);
    let data = serde_json::to_vec(results)?;

    info!("Saving results to {} in bucket {}", key, bucket);

    store.put_bytes(bucket, &key, data, JSON_CONTENT_TYPE).await?;
    Ok(key)
}

/// Download and parse a result document.
pub async fn load_results<T: DetectionRecord>(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
) -> StorageResult<DetectionResults<T>> {
    let bytes = store.get_bytes(bucket, key).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
