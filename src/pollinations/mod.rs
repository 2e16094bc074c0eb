pub mod image_client;
pub mod model_client;
pub mod remote;
pub mod speech_client;
pub mod transport;

use crate::{
    config::PollinationsConfig,
    error::Result,
    models::{GenerationRequest, GenerationResult},
};
use async_trait::async_trait;
use std::sync::Arc;

pub use image_client::ImageClient;
pub use model_client::ModelClient;
pub use remote::RemoteGateway;
pub use speech_client::SpeechClient;
pub use transport::{HttpTransport, Transport, UpstreamHead, UpstreamRequest, UpstreamResponse};

/// Percent-encodes text for use as one path segment, leaving the same
/// marks unescaped as JavaScript's `encodeURIComponent`:
/// ASCII alphanumerics and `- _ . ! ~ * ' ( )`.
pub fn encode_uri_component(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for c in text.chars() {
        if c.is_ascii_alphanumeric() || "-_.!~*'()".contains(c) {
            encoded.push(c);
        } else {
            encoded.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    encoded
}

/// Anything that can turn a request into a generated image: the in-process
/// gateway or a remote one.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult>;
}

#[async_trait]
impl ImageGenerator for ImageClient {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult> {
        ImageClient::generate(self, request).await
    }
}

#[async_trait]
impl ImageGenerator for RemoteGateway {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult> {
        RemoteGateway::generate(self, request).await
    }
}

/// All provider capabilities sharing one transport.
#[derive(Clone)]
pub struct PollinationsClient {
    transport: Arc<dyn Transport>,
    image_client: ImageClient,
    speech_client: SpeechClient,
    model_client: ModelClient,
}

impl PollinationsClient {
    pub fn new(config: PollinationsConfig) -> Self {
        Self::with_transport(Arc::new(HttpTransport::new()), config)
    }

    pub fn with_transport(transport: Arc<dyn Transport>, config: PollinationsConfig) -> Self {
        Self {
            image_client: ImageClient::new(transport.clone(), config.clone()),
            speech_client: SpeechClient::new(transport.clone(), config.clone()),
            model_client: ModelClient::new(transport.clone(), config),
            transport,
        }
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn speech(&self) -> &SpeechClient {
        &self.speech_client
    }

    pub fn models(&self) -> &ModelClient {
        &self.model_client
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }
}
