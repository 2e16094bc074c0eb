use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Number;

use super::common::{DEFAULT_IMAGE_MODEL, TRANSPARENT_MODEL};

/// Options for one image generation, as posted to `/generate-image`.
///
/// Every option is optional; unset options are left to the provider's
/// defaults rather than being sent as empty or false values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Number>,
    #[serde(
        default,
        deserialize_with = "blank_seed_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub seed: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nologo: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhance: Option<bool>,
    #[serde(default, rename = "private", skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// The options the interactive client starts from: flux at 1024x1024
    /// without the provider logo.
    pub fn with_client_defaults(prompt: impl Into<String>) -> Self {
        Self::new(prompt)
            .with_model(DEFAULT_IMAGE_MODEL)
            .with_size(1024, 1024)
            .with_nologo(true)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width.into());
        self.height = Some(height.into());
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed.into());
        self
    }

    pub fn with_nologo(mut self, nologo: bool) -> Self {
        self.nologo = Some(nologo);
        self
    }

    pub fn with_enhance(mut self, enhance: bool) -> Self {
        self.enhance = Some(enhance);
        self
    }

    pub fn with_private(mut self, is_private: bool) -> Self {
        self.is_private = Some(is_private);
        self
    }

    pub fn with_safe(mut self, safe: bool) -> Self {
        self.safe = Some(safe);
        self
    }

    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = Some(transparent);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// True when the prompt has something other than whitespace in it.
    pub fn has_prompt(&self) -> bool {
        !self.prompt.trim().is_empty()
    }

    /// Model name, if one was given and is non-empty.
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().filter(|m| !m.is_empty())
    }

    /// `transparent` only counts for the model that supports it.
    pub fn wants_transparency(&self) -> bool {
        self.transparent == Some(true) && self.model_name() == Some(TRANSPARENT_MODEL)
    }
}

/// An explicit `null` prompt is treated like a missing one.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeedInput {
    Number(Number),
    Text(String),
}

/// Accepts a number, a numeric string, or an empty string (meaning "random").
fn blank_seed_as_none<'de, D>(deserializer: D) -> Result<Option<Number>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<SeedInput>::deserialize(deserializer)? {
        None => Ok(None),
        Some(SeedInput::Number(n)) => Ok(Some(n)),
        Some(SeedInput::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(SeedInput::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
