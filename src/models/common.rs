use serde::{Deserialize, Serialize};

/// Models offered when the provider's model list cannot be fetched.
pub const FALLBACK_MODELS: &[&str] = &["flux", "gptimage", "kontext"];

/// The only model that honours `transparent`.
pub const TRANSPARENT_MODEL: &str = "gptimage";

pub const DEFAULT_IMAGE_MODEL: &str = "flux";

/// Error body shared by every non-200 response of the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiErrorBody {
    pub error: String,
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Turns a prompt into a file-name fragment: the first 20 characters,
/// with each whitespace run collapsed to a single `-`.
pub fn prompt_slug(prompt: &str) -> String {
    let head: String = prompt.chars().take(20).collect();
    let mut slug = String::with_capacity(head.len());
    let mut in_space = false;
    for c in head.chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.push(c);
            in_space = false;
        }
    }
    slug
}

/// RFC 3339 timestamps with millisecond precision and a `Z` suffix.
pub mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
