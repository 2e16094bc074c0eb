use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use super::common::prompt_slug;
use crate::error::ArtGenError;

pub const SPEECH_MODEL: &str = "openai-audio";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Alloy,
    Echo,
    Fable,
    Onyx,
    #[default]
    Nova,
    Shimmer,
}

impl Voice {
    pub const ALL: [Voice; 6] = [
        Voice::Alloy,
        Voice::Echo,
        Voice::Fable,
        Voice::Onyx,
        Voice::Nova,
        Voice::Shimmer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Voice {
    type Err = ArtGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Voice::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ArtGenError::RequestError(format!("Unknown voice: {}", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub prompt: String,
    #[serde(default)]
    pub voice: Voice,
}

impl SpeechRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            voice: Voice::default(),
        }
    }

    pub fn with_voice(mut self, voice: Voice) -> Self {
        self.voice = voice;
        self
    }

    /// The instruction actually sent to the text model.
    pub fn instruction(&self) -> String {
        format!("Say: {}", self.prompt)
    }

    pub fn download_file_name(&self) -> String {
        format!("ai-audio-{}.mp3", prompt_slug(&self.prompt))
    }
}

/// Synthesized audio held in memory.
#[derive(Debug, Clone)]
pub struct SpeechClip {
    pub content_type: String,
    pub audio: Vec<u8>,
}

impl SpeechClip {
    /// Inline `data:` URL, playable without writing the clip to disk.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, BASE64.encode(&self.audio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_parses_case_insensitively() {
        assert_eq!("Shimmer".parse::<Voice>().unwrap(), Voice::Shimmer);
        assert!("robot".parse::<Voice>().is_err());
        assert_eq!(Voice::default(), Voice::Nova);
    }

    #[test]
    fn instruction_prefixes_say() {
        let request = SpeechRequest::new("hello there");
        assert_eq!(request.instruction(), "Say: hello there");
        assert_eq!(request.download_file_name(), "ai-audio-hello-there.mp3");
    }

    #[test]
    fn data_url_is_base64() {
        let clip = SpeechClip {
            content_type: "audio/mpeg".to_string(),
            audio: b"abc".to_vec(),
        };
        assert_eq!(clip.to_data_url(), "data:audio/mpeg;base64,YWJj");
    }
}
