//! Request and response types shared by the capability traits.

use reelsmith_core::WordTiming;
use serde::{Deserialize, Serialize};

/// Text generation request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextRequest {
    /// User prompt
    pub prompt: String,
    /// Optional system instruction
    pub system: Option<String>,
    /// Maximum number of tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl TextRequest {
    /// Request with only a prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens
    pub prompt_tokens: u32,
    /// Completion tokens
    pub completion_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
}

/// Text generation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextResponse {
    /// Generated text
    pub text: String,
    /// Usage, when the provider reports it
    pub usage: Option<TokenUsage>,
}

/// Image generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRequest {
    /// Image prompt
    pub prompt: String,
    /// Filename prefix hint for job-based renderers
    pub filename_hint: String,
}

/// Bytes produced by a generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedMedia {
    /// Raw bytes
    pub data: Vec<u8>,
    /// MIME type of `data`
    pub mime_type: String,
}

impl GeneratedMedia {
    /// Wrap bytes with their MIME type.
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }
}

/// Speech synthesis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRequest {
    /// Cleaned text to speak
    pub text: String,
    /// Speaking-rate multiplier (1.0 is normal)
    pub speed_ratio: f32,
}

/// Speech synthesis result.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechOutput {
    /// Encoded audio
    pub audio: Vec<u8>,
    /// MIME type of `audio`
    pub mime_type: String,
    /// Audio length in seconds
    pub duration_secs: f64,
    /// Word timings; may be partial when the provider payload was damaged
    pub word_timings: Vec<WordTiming>,
}

/// Image-to-video request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRequest {
    /// Source image as a `data:` URL
    pub image_data_url: String,
    /// Clip length in seconds, at most 12
    pub duration_secs: u32,
    /// Motion prompt
    pub prompt: String,
}
