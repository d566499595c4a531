//! API configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "config.json";

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Serve Prometheus metrics at /metrics
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: vec!["*".to_string()],
            max_body_size: 1024 * 1024, // 1MB
            environment: "development".to_string(),
            metrics_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .or_else(|_| std::env::var("PORT"))
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

/// Errors loading the function configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("RESULT_BUCKET is empty")]
    MissingResultBucket,
}

/// Settings shared by the functions, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bucket receiving `<name>.objects.json` / `<name>.faces.json`
    #[serde(rename = "RESULT_BUCKET")]
    pub result_bucket: String,
}

impl AppConfig {
    pub fn new(result_bucket: impl Into<String>) -> Self {
        Self {
            result_bucket: result_bucket.into(),
        }
    }

    /// Load a JSON config file. Keys other than `RESULT_BUCKET` are ignored.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_slice(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validated()
    }

    /// Load from `VLAB_CONFIG` (default `config.json`), with `RESULT_BUCKET`
    /// taking precedence over the file.
    ///
    /// The file may be absent when the environment supplies the bucket.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var("VLAB_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_with_override(path, std::env::var("RESULT_BUCKET").ok())
    }

    /// Load `path`, replacing the bucket with `result_bucket` when given.
    pub fn load_with_override(
        path: impl AsRef<Path>,
        result_bucket: Option<String>,
    ) -> Result<Self, ConfigError> {
        match result_bucket.filter(|b| !b.trim().is_empty()) {
            Some(bucket) => Self::new(bucket).validated(),
            None => Self::load(path),
        }
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.result_bucket.trim().is_empty() {
            return Err(ConfigError::MissingResultBucket);
        }
        Ok(self)
    }
}
