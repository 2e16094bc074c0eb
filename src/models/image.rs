use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::iso8601;

/// What the gateway hands back for a successful generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub image_url: String,
    pub prompt: String,
    #[serde(with = "iso8601")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelList {
    pub models: Vec<String>,
    /// True when the list is the built-in fallback rather than the provider's.
    pub fallback: bool,
}
