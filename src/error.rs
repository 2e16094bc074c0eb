use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtGenError {
    #[error("Prompt is required")]
    MissingPrompt,
    #[error("API token not configured")]
    MisconfiguredCredential,
    #[error("Upstream API error: {status}")]
    UpstreamError { status: u16 },
    #[error("API did not return audio. Try a different prompt or voice.")]
    NotAudio,
    #[error("A generation is already in progress")]
    Busy,
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Server error: {0}")]
    ServerError(String),
}

impl ArtGenError {
    /// Whether the caller can fix this by changing the request.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, ArtGenError::MissingPrompt | ArtGenError::Busy)
    }
}

impl From<serde_json::Error> for ArtGenError {
    fn from(e: serde_json::Error) -> Self {
        ArtGenError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for ArtGenError {
    fn from(e: std::io::Error) -> Self {
        ArtGenError::StorageError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ArtGenError>;
