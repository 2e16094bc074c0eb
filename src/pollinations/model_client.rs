use std::sync::Arc;

use crate::{
    config::PollinationsConfig,
    error::{ArtGenError, Result},
    models::{ModelList, FALLBACK_MODELS},
    pollinations::transport::{Transport, UpstreamRequest},
};
use reqwest::Url;

#[derive(Clone)]
pub struct ModelClient {
    transport: Arc<dyn Transport>,
    config: PollinationsConfig,
}

impl ModelClient {
    pub fn new(transport: Arc<dyn Transport>, config: PollinationsConfig) -> Self {
        Self { transport, config }
    }

    /// Image models offered by the provider. Never fails: any problem
    /// fetching or parsing the list yields the built-in fallback.
    pub async fn list_models(&self) -> ModelList {
        match self.fetch_models().await {
            Ok(models) if !models.is_empty() => ModelList {
                models,
                fallback: false,
            },
            Ok(_) => {
                log::warn!("⚠️  Provider returned an empty model list, using fallback");
                Self::fallback()
            }
            Err(e) => {
                log::warn!("⚠️  Could not fetch models ({}), using fallback", e);
                Self::fallback()
            }
        }
    }

    pub fn fallback() -> ModelList {
        ModelList {
            models: FALLBACK_MODELS.iter().map(|m| m.to_string()).collect(),
            fallback: true,
        }
    }

    async fn fetch_models(&self) -> Result<Vec<String>> {
        let url = Url::parse(&self.config.models_url())
            .map_err(|e| ArtGenError::ConfigError(format!("Invalid models URL: {}", e)))?;
        let response = self
            .transport
            .fetch(UpstreamRequest::new(url, &self.config.user_agent))
            .await?;

        if !response.head.is_success() {
            return Err(ArtGenError::UpstreamError {
                status: response.head.status,
            });
        }

        Ok(serde_json::from_slice(&response.body)?)
    }
}
