//! Vision API HTTP client.

use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use tracing::{debug, info, info_span, warn, Instrument};
use vlab_gcp_auth::{Credentials, VISION_SCOPE};

use crate::error::{VisionError, VisionResult};
use crate::metrics::{record_annotations, record_request, record_retry};
use crate::types::{
    AnnotateImageResponse, BatchAnnotateImagesRequest, BatchAnnotateImagesResponse,
    FaceAnnotation, FeatureType, ImageInput, LocalizedObjectAnnotation,
};

const DEFAULT_BASE_URL: &str = "https://vision.googleapis.com";

/// Configuration for the vision client.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Base URL of the vision API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries on transient failures
    pub max_retries: u32,
    /// First retry delay, doubled on each attempt
    pub retry_base_delay: Duration,
    /// Cap on returned annotations per image
    pub max_results: Option<u32>,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
            max_results: None,
        }
    }
}

impl VisionConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("VISION_API_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(
                std::env::var("VISION_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            max_retries: std::env::var("VISION_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            retry_base_delay: Duration::from_millis(500),
            max_results: std::env::var("VISION_MAX_RESULTS")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }
}

/// Client for the Cloud Vision `images:annotate` endpoint.
#[derive(Clone)]
pub struct VisionClient {
    http: Client,
    config: VisionConfig,
    credentials: Credentials,
}

impl VisionClient {
    pub fn new(config: VisionConfig, credentials: Credentials) -> VisionResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("vlab-vision/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(VisionError::Network)?;

        Ok(Self {
            http,
            config,
            credentials,
        })
    }

    /// Create from environment variables (`VISION_API_KEY` or Google credentials).
    pub async fn from_env() -> VisionResult<Self> {
        let credentials = Credentials::from_env(Some("VISION_API_KEY"), VISION_SCOPE).await?;
        Self::new(VisionConfig::from_env(), credentials)
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    /// Localize objects in an image.
    pub async fn localize_objects(&self, image: &ImageInput) -> VisionResult<Vec<LocalizedObjectAnnotation>> {
        let response = self.annotate(image, FeatureType::ObjectLocalization).await?;
        let objects = response.localized_object_annotations;

        info!("Number of objects found: {}", objects.len());
        for object in &objects {
            let vertices: Vec<String> = object
                .bounding_poly
                .normalized_vertices
                .iter()
                .map(|v| format!("({}, {})", v.x, v.y))
                .collect();
            debug!(
                name = %object.name,
                confidence = object.score,
                "Normalized bounding polygon vertices: {}",
                vertices.join(" ")
            );
        }

        record_annotations(FeatureType::ObjectLocalization.as_str(), objects.len());
        Ok(objects)
    }

    /// Detect faces and their emotion likelihoods.
    pub async fn detect_faces(&self, image: &ImageInput) -> VisionResult<Vec<FaceAnnotation>> {
        let response = self.annotate(image, FeatureType::FaceDetection).await?;
        let faces = response.face_annotations;

        info!("Number of faces found: {}", faces.len());
        for face in &faces {
            let bounds: Vec<String> = face
                .bounding_poly
                .vertices
                .iter()
                .map(|v| format!("({},{})", v.x, v.y))
                .collect();
            debug!(
                anger = %face.anger_likelihood,
                joy = %face.joy_likelihood,
                surprise = %face.surprise_likelihood,
                "face bounds: {}",
                bounds.join(",")
            );
        }

        record_annotations(FeatureType::FaceDetection.as_str(), faces.len());
        Ok(faces)
    }

    /// Run one feature on one image and return its response entry.
    pub async fn annotate(&self, image: &ImageInput, feature: FeatureType) -> VisionResult<AnnotateImageResponse> {
        let url = format!("{}/v1/images:annotate", self.config.base_url.trim_end_matches('/'));
        let request = BatchAnnotateImagesRequest::single(image, feature, self.config.max_results);
        let span = info_span!("vision_request", feature = feature.as_str(), image = %image.describe());

        let start = Instant::now();
        let result = self
            .with_retry(feature, || self.send(&url, &request))
            .instrument(span)
            .await;
        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status(),
        };
        record_request(feature.as_str(), status, start.elapsed().as_millis() as f64);

        let batch = result?;
        let response = batch
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| VisionError::InvalidResponse("empty responses array".to_string()))?;

        if let Some(status) = &response.error {
            if status.code != 0 {
                return Err(VisionError::Annotation {
                    code: status.code,
                    message: status.message.clone(),
                });
            }
        }

        Ok(response)
    }

    async fn send(&self, url: &str, request: &BatchAnnotateImagesRequest) -> VisionResult<BatchAnnotateImagesResponse> {
        debug!("Sending annotate request to {}", url);

        let mut response = self
            .credentials
            .authorize(self.http.post(url).json(request))
            .await?
            .send()
            .await?;

        // Expired OAuth token: refresh once and resend.
        if response.status() == StatusCode::UNAUTHORIZED && self.credentials.can_refresh() {
            warn!("Vision request unauthorized, refreshing token");
            self.credentials.invalidate().await;
            response = self
                .credentials
                .authorize(self.http.post(url).json(request))
                .await?
                .send()
                .await?;
        }

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(VisionError::from_http_status(status.as_u16(), body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, feature: FeatureType, operation: F) -> VisionResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = VisionResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.retry_base_delay * 2u32.pow(attempt);
                    warn!(
                        "Vision request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    record_retry(feature.as_str());
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| VisionError::RequestFailed("Unknown error".to_string())))
    }
}
