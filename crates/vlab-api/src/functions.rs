//! The two image functions: annotate, then persist the results.
//!
//! Both run the same straight-line sequence. The image is referenced by
//! its `gs://` URI so the vision service reads it directly; the results
//! are written to the configured results bucket as
//! `<image name>.<kind>.json`.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};
use vlab_models::{DetectionRecord, DetectionResults, FaceDetection, ObjectDetection, StorageEvent};
use vlab_storage::{save_results, ObjectStore};
use vlab_vision::{ImageInput, VisionClient};

use crate::error::{ApiError, ApiResult};
use crate::metrics;

/// What a function invocation produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionOutcome {
    /// Image the function ran on
    pub source: String,
    pub result_bucket: String,
    /// Key of the results document in `result_bucket`
    pub result_file: String,
    /// Number of detections saved
    pub count: usize,
}

/// Localize objects in the image and save `<name>.objects.json`.
pub async fn localize_objects(
    vision: &VisionClient,
    store: &dyn ObjectStore,
    result_bucket: &str,
    event: &StorageEvent,
) -> ApiResult<FunctionOutcome> {
    let span = info_span!("localize_objects", image = %event);
    run(event, result_bucket, store, async {
        let objects = vision.localize_objects(&ImageInput::uri(event.gcs_uri())).await?;
        Ok::<_, ApiError>(
            objects
                .iter()
                .map(|o| o.to_detection())
                .collect::<DetectionResults<ObjectDetection>>(),
        )
    })
    .instrument(span)
    .await
}

/// Detect faces in the image and save `<name>.faces.json`.
pub async fn detect_faces(
    vision: &VisionClient,
    store: &dyn ObjectStore,
    result_bucket: &str,
    event: &StorageEvent,
) -> ApiResult<FunctionOutcome> {
    let span = info_span!("detect_faces", image = %event);
    run(event, result_bucket, store, async {
        let faces = vision.detect_faces(&ImageInput::uri(event.gcs_uri())).await?;
        Ok::<_, ApiError>(
            faces
                .iter()
                .map(|f| f.to_detection())
                .collect::<DetectionResults<FaceDetection>>(),
        )
    })
    .instrument(span)
    .await
}

async fn run<T, F>(
    event: &StorageEvent,
    result_bucket: &str,
    store: &dyn ObjectStore,
    detect: F,
) -> ApiResult<FunctionOutcome>
where
    T: DetectionRecord,
    F: std::future::Future<Output = ApiResult<DetectionResults<T>>>,
{
    let function = T::KIND.as_str();
    let start = Instant::now();
    info!("Processing {}", event.gcs_uri());

    let result = async {
        let results = detect.await?;
        let result_file = save_results(store, result_bucket, &event.name, &results).await?;
        Ok::<_, ApiError>(FunctionOutcome {
            source: event.gcs_uri(),
            result_bucket: result_bucket.to_string(),
            result_file,
            count: results.len(),
        })
    }
    .await;

    metrics::record_function(function, &result, start.elapsed().as_secs_f64());
    result
}
