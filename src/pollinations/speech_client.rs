use std::sync::Arc;

use crate::{
    config::PollinationsConfig,
    error::{ArtGenError, Result},
    models::{SpeechClip, SpeechRequest, SPEECH_MODEL},
    pollinations::{
        encode_uri_component,
        transport::{Transport, UpstreamRequest},
    },
};
use reqwest::Url;

/// Text-to-speech through the provider's text endpoint. This path does
/// not go through the gateway and sends no credential.
#[derive(Clone)]
pub struct SpeechClient {
    transport: Arc<dyn Transport>,
    config: PollinationsConfig,
}

impl SpeechClient {
    pub fn new(transport: Arc<dyn Transport>, config: PollinationsConfig) -> Self {
        Self { transport, config }
    }

    pub fn build_url(&self, request: &SpeechRequest) -> Result<Url> {
        let raw = format!(
            "{}/{}",
            self.config.text_base_url.trim_end_matches('/'),
            encode_uri_component(&request.instruction())
        );
        let mut url = Url::parse(&raw)
            .map_err(|e| ArtGenError::ConfigError(format!("Invalid text base URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("model", SPEECH_MODEL)
            .append_pair("voice", request.voice.as_str());
        Ok(url)
    }

    pub async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechClip> {
        if request.prompt.trim().is_empty() {
            return Err(ArtGenError::MissingPrompt);
        }

        let url = self.build_url(&request)?;
        log::info!("🔊 Synthesizing speech with voice: {}", request.voice);

        let response = self
            .transport
            .fetch(UpstreamRequest::new(url, &self.config.user_agent))
            .await?;

        if !response.head.is_success() {
            log::error!("❌ Speech request failed: {}", response.head.status);
            return Err(ArtGenError::UpstreamError {
                status: response.head.status,
            });
        }

        let content_type = response.head.content_type.unwrap_or_default();
        if !content_type.starts_with("audio/") {
            log::warn!("⚠️  Speech endpoint answered with {:?}", content_type);
            return Err(ArtGenError::NotAudio);
        }

        log::debug!("Received {} bytes of {}", response.body.len(), content_type);
        Ok(SpeechClip {
            content_type,
            audio: response.body,
        })
    }
}
