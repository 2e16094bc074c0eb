use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::common::{iso8601, prompt_slug};

/// One saved generation in the local gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryRecord {
    pub id: String,
    pub url: String,
    pub prompt: String,
    #[serde(with = "iso8601")]
    pub timestamp: DateTime<Utc>,
}

impl GalleryRecord {
    /// Builds a record stamped with the current time. The id is the
    /// creation time in milliseconds.
    pub fn new(url: impl Into<String>, prompt: impl Into<String>) -> Self {
        let timestamp = Utc::now().trunc_subsecs(3);
        Self {
            id: timestamp.timestamp_millis().to_string(),
            url: url.into(),
            prompt: prompt.into(),
            timestamp,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Suggested file name when saving the image locally.
    pub fn download_file_name(&self) -> String {
        format!("ai-generated-{}.png", prompt_slug(&self.prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_creation_millis() {
        let record = GalleryRecord::new("https://img.example/x.png", "a cat");
        assert_eq!(record.id, record.timestamp.timestamp_millis().to_string());
    }

    #[test]
    fn timestamp_round_trips_through_json() {
        let record = GalleryRecord::new("https://img.example/x.png", "a cat");
        let json = serde_json::to_string(&record).unwrap();
        let back: GalleryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn download_name_uses_prompt_slug() {
        let record = GalleryRecord::new("https://img.example/x.png", "a magical forest");
        assert_eq!(record.download_file_name(), "ai-generated-a-magical-forest.png");
    }
}
