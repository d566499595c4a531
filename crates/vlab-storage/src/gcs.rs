//! Cloud Storage JSON API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, info, warn};
use vlab_gcp_auth::{Credentials, STORAGE_SCOPE};

use crate::error::{StorageError, StorageResult};
use crate::metrics::observe;
use crate::retry::{with_retry, RetryConfig};
use crate::store::{ObjectStore, StorageBackend};

const DEFAULT_BASE_URL: &str = "https://storage.googleapis.com";

/// Cloud Storage client configuration.
#[derive(Debug, Clone)]
pub struct GcsConfig {
    /// API root, overridden for emulators
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
}

impl Default for GcsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(5),
            retry: RetryConfig::default(),
        }
    }
}

impl GcsConfig {
    /// Create config from environment variables.
    ///
    /// `STORAGE_EMULATOR_HOST` (as used by fake-gcs-server) replaces the
    /// API root when set.
    pub fn from_env() -> Self {
        let base_url = std::env::var("STORAGE_EMULATOR_HOST")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            base_url,
            timeout: Duration::from_secs(
                std::env::var("STORAGE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            connect_timeout: Duration::from_secs(5),
            retry: RetryConfig::from_env(),
        }
    }

    pub fn is_emulator(&self) -> bool {
        self.base_url != DEFAULT_BASE_URL
    }
}

/// Cloud Storage client.
#[derive(Clone)]
pub struct GcsClient {
    http: Client,
    config: GcsConfig,
    credentials: Credentials,
}

impl GcsClient {
    pub fn new(config: GcsConfig, credentials: Credentials) -> StorageResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("vlab-storage/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StorageError::Network)?;

        Ok(Self {
            http,
            config,
            credentials,
        })
    }

    /// Create from environment variables. Emulators are used without credentials.
    pub async fn from_env() -> StorageResult<Self> {
        let config = GcsConfig::from_env();
        let credentials = if config.is_emulator() {
            info!("Using storage emulator at {}", config.base_url);
            Credentials::Anonymous
        } else {
            Credentials::from_env(None, STORAGE_SCOPE).await?
        };
        Self::new(config, credentials)
    }

    fn root(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn upload_url(&self, bucket: &str) -> String {
        format!("{}/upload/storage/v1/b/{}/o", self.root(), bucket)
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/storage/v1/b/{}/o/{}",
            self.root(),
            bucket,
            urlencoding::encode(key)
        )
    }

    fn bucket_url(&self, bucket: &str) -> String {
        format!("{}/storage/v1/b/{}", self.root(), bucket)
    }

    /// Send with credentials, refreshing the token once on 401.
    async fn send(&self, build: impl Fn() -> RequestBuilder) -> StorageResult<Response> {
        let response = self.credentials.authorize(build()).await?.send().await?;

        if response.status() == StatusCode::UNAUTHORIZED && self.credentials.can_refresh() {
            warn!("Storage request unauthorized, refreshing token");
            self.credentials.invalidate().await;
            return Ok(self.credentials.authorize(build()).await?.send().await?);
        }

        Ok(response)
    }
}

#[async_trait]
impl ObjectStore for GcsClient {
    async fn put_bytes(&self, bucket: &str, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        let url = self.upload_url(bucket);
        let object = format!("{}/{}", bucket, key);

        observe(self.backend().as_str(), "put", bucket, key, async {
            debug!("Uploading {} bytes to gs://{}", data.len(), object);

            with_retry(&self.config.retry, "put", || async {
                let response = self
                    .send(|| {
                        self.http
                            .post(&url)
                            .query(&[("uploadType", "media"), ("name", key)])
                            .header(CONTENT_TYPE, content_type)
                            .body(data.clone())
                    })
                    .await?;

                let status = response.status();
                if status.is_success() {
                    return Ok(());
                }
                let body = response.text().await.unwrap_or_default();
                Err(StorageError::from_http_status(
                    status.as_u16(),
                    &object,
                    body,
                    StorageError::UploadFailed,
                ))
            })
            .await
        })
        .await
    }

    async fn get_bytes(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        let url = self.object_url(bucket, key);
        let object = format!("{}/{}", bucket, key);

        observe(self.backend().as_str(), "get", bucket, key, async {
            debug!("Downloading gs://{}", object);

            with_retry(&self.config.retry, "get", || async {
                let response = self
                    .send(|| self.http.get(&url).query(&[("alt", "media")]))
                    .await?;

                let status = response.status();
                if status.is_success() {
                    return Ok(response.bytes().await?.to_vec());
                }
                let body = response.text().await.unwrap_or_default();
                Err(StorageError::from_http_status(
                    status.as_u16(),
                    &object,
                    body,
                    StorageError::DownloadFailed,
                ))
            })
            .await
        })
        .await
    }

    async fn check_connectivity(&self, bucket: &str) -> StorageResult<()> {
        let url = self.bucket_url(bucket);

        observe(self.backend().as_str(), "head_bucket", bucket, "", async {
            let response = self.send(|| self.http.get(&url)).await?;
            let status = response.status();
            if status.is_success() {
                return Ok(());
            }
            let body = response.text().await.unwrap_or_default();
            Err(StorageError::from_http_status(
                status.as_u16(),
                bucket,
                body,
                StorageError::ConfigError,
            ))
        })
        .await
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Gcs
    }
}
