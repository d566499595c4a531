//! Application state.

use std::sync::Arc;

use vlab_storage::ObjectStore;
use vlab_vision::VisionClient;

use crate::config::{ApiConfig, AppConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub app_config: AppConfig,
    pub vision: Arc<VisionClient>,
    pub storage: Arc<dyn ObjectStore>,
}

impl AppState {
    /// Create new application state from the environment.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let app_config = AppConfig::from_env()?;
        let vision = VisionClient::from_env().await?;
        let storage = vlab_storage::from_env().await?;

        Ok(Self::from_parts(config, app_config, vision, storage))
    }

    /// Assemble state from already constructed clients.
    pub fn from_parts(
        config: ApiConfig,
        app_config: AppConfig,
        vision: VisionClient,
        storage: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            config,
            app_config,
            vision: Arc::new(vision),
            storage,
        }
    }

    pub fn result_bucket(&self) -> &str {
        &self.app_config.result_bucket
    }
}
