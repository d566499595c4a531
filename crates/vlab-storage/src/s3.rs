//! S3-compatible storage client.
//!
//! Works against Cloud Storage's XML interoperability endpoint
//! (`https://storage.googleapis.com` with HMAC keys), MinIO and R2.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::metrics::observe;
use crate::store::{ObjectStore, StorageBackend};

/// Configuration for an S3-compatible endpoint.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// S3 API endpoint URL
    pub endpoint_url: String,
    /// Access key ID (HMAC key for GCS)
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Region ("auto" works for GCS and R2)
    pub region: String,
}

impl S3Config {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("S3_ENDPOINT_URL")
                .unwrap_or_else(|_| "https://storage.googleapis.com".to_string()),
            access_key_id: std::env::var("S3_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("S3_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("S3_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("S3_SECRET_ACCESS_KEY not set"))?,
            region: std::env::var("S3_REGION").unwrap_or_else(|_| "auto".to_string()),
        })
    }
}

/// S3-compatible storage client.
#[derive(Clone)]
pub struct S3Client {
    client: Client,
}

impl S3Client {
    pub fn new(config: S3Config) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "vlab-s3",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        info!("Using S3-compatible endpoint {}", config.endpoint_url);

        Self {
            client: Client::from_conf(sdk_config),
        }
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        Ok(Self::new(S3Config::from_env()?))
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn put_bytes(&self, bucket: &str, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        observe(self.backend().as_str(), "put", bucket, key, async {
            debug!("Uploading {} bytes to s3://{}/{}", data.len(), bucket, key);

            self.client
                .put_object()
                .bucket(bucket)
                .key(key)
                .body(ByteStream::from(data))
                .content_type(content_type)
                .send()
                .await
                .map_err(|e| StorageError::upload_failed(e.to_string()))?;

            Ok(())
        })
        .await
    }

    async fn get_bytes(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        observe(self.backend().as_str(), "get", bucket, key, async {
            debug!("Downloading s3://{}/{}", bucket, key);

            let response = self
                .client
                .get_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| {
                    if e.as_service_error().map(|se| se.is_no_such_key()).unwrap_or(false) {
                        StorageError::not_found(format!("{}/{}", bucket, key))
                    } else {
                        StorageError::download_failed(e.to_string())
                    }
                })?;

            let bytes = response
                .body
                .collect()
                .await
                .map_err(|e| StorageError::download_failed(e.to_string()))?
                .into_bytes()
                .to_vec();

            Ok(bytes)
        })
        .await
    }

    async fn check_connectivity(&self, bucket: &str) -> StorageResult<()> {
        observe(self.backend().as_str(), "head_bucket", bucket, "", async {
            self.client
                .head_bucket()
                .bucket(bucket)
                .send()
                .await
                .map_err(|e| StorageError::AwsSdk(e.to_string()))?;
            Ok(())
        })
        .await
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
