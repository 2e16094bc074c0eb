use std::sync::Arc;

use crate::{
    config::PollinationsConfig,
    error::{ArtGenError, Result},
    logger,
    models::{GenerationRequest, GenerationResult},
    pollinations::{
        encode_uri_component,
        transport::{Transport, UpstreamRequest},
    },
};
use chrono::Utc;
use reqwest::Url;

/// The gateway: turns a [`GenerationRequest`] into one provider call and
/// reports where the generated image lives.
#[derive(Clone)]
pub struct ImageClient {
    transport: Arc<dyn Transport>,
    config: PollinationsConfig,
}

impl ImageClient {
    pub fn new(transport: Arc<dyn Transport>, config: PollinationsConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &PollinationsConfig {
        &self.config
    }

    pub fn build_url(&self, request: &GenerationRequest) -> Result<Url> {
        let raw = format!(
            "{}/prompt/{}",
            self.config.image_base_url.trim_end_matches('/'),
            encode_uri_component(&request.prompt)
        );
        let mut url = Url::parse(&raw)
            .map_err(|e| ArtGenError::ConfigError(format!("Invalid image base URL: {}", e)))?;

        let query = build_query(request);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult> {
        if !request.has_prompt() {
            return Err(ArtGenError::MissingPrompt);
        }
        let token = self
            .config
            .resolve_token()
            .ok_or(ArtGenError::MisconfiguredCredential)?;

        let url = self.build_url(&request)?;
        let _timer = logger::timer("image generation");
        log::info!(
            "🎨 Generating image with model: {}",
            request.model_name().unwrap_or("default")
        );
        log::debug!("Pollinations request URL: {}", url);

        let head = self
            .transport
            .resolve(UpstreamRequest::new(url, &self.config.user_agent).with_bearer(token))
            .await?;

        if !head.is_success() {
            log::error!("❌ Pollinations API error: {}", head.status);
            return Err(ArtGenError::UpstreamError {
                status: head.status,
            });
        }

        Ok(GenerationResult {
            image_url: head.final_url,
            prompt: request.prompt,
            timestamp: Utc::now(),
        })
    }
}

/// Query parameters for the provider, in the order it documents them.
/// Unset options are left out entirely; `nologo` is the one flag sent
/// even when false.
pub fn build_query(request: &GenerationRequest) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    let flag = |set: Option<bool>| set == Some(true);

    if let Some(model) = request.model_name() {
        params.push(("model", model.to_string()));
    }
    let non_zero = |n: &&serde_json::Number| n.as_f64() != Some(0.0);

    if let Some(width) = request.width.as_ref().filter(non_zero) {
        params.push(("width", width.to_string()));
    }
    if let Some(height) = request.height.as_ref().filter(non_zero) {
        params.push(("height", height.to_string()));
    }
    if let Some(seed) = &request.seed {
        params.push(("seed", seed.to_string()));
    }
    if let Some(nologo) = request.nologo {
        params.push(("nologo", nologo.to_string()));
    }
    if flag(request.enhance) {
        params.push(("enhance", "true".to_string()));
    }
    if flag(request.is_private) {
        params.push(("private", "true".to_string()));
    }
    if flag(request.safe) {
        params.push(("safe", "true".to_string()));
    }
    if request.wants_transparency() {
        params.push(("transparent", "true".to_string()));
    }
    if let Some(image) = request.image.as_deref().filter(|s| !s.is_empty()) {
        params.push(("image", image.to_string()));
    }
    if let Some(referrer) = request.referrer.as_deref().filter(|s| !s.is_empty()) {
        params.push(("referrer", referrer.to_string()));
    }
    if let Some(temperature) = request.temperature {
        params.push(("temperature", temperature.to_string()));
    }

    params
}
