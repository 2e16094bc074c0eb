use crate::{
    error::{ArtGenError, Result},
    models::{ApiErrorBody, GenerationRequest, GenerationResult},
};
use reqwest::{Client, StatusCode};

/// Client for a running `artgen serve` instance. Lets a front-end use
/// the gateway without ever holding the provider token.
#[derive(Clone)]
pub struct RemoteGateway {
    client: Client,
    base_url: String,
}

impl RemoteGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/generate-image", self.base_url.trim_end_matches('/'))
    }

    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult> {
        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| ArtGenError::RequestError(format!("Gateway request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ArtGenError::ResponseError(e.to_string()))?;

        if status.is_success() {
            Ok(serde_json::from_slice(&body)?)
        } else {
            Err(decode_error(status, &body))
        }
    }
}

/// Maps the gateway's `{error}` responses back onto crate errors.
pub(crate) fn decode_error(status: StatusCode, body: &[u8]) -> ArtGenError {
    let message = serde_json::from_slice::<ApiErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| format!("gateway answered {}", status));

    match status {
        StatusCode::BAD_REQUEST => ArtGenError::MissingPrompt,
        _ => ArtGenError::ServerError(message),
    }
}
