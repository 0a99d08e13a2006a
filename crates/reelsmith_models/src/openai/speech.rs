//! OpenAI-compatible `/audio/speech`.

use crate::http::{http_client, read_bytes, transport};
use super::dto::SpeechGenerationRequest;
use async_trait::async_trait;
use reelsmith_config::{EndpointSettings, SpeechProviderConfig};
use reelsmith_error::{ProviderError, ProviderErrorKind, ReelsmithResult};
use reelsmith_interface::{SpeechOutput, SpeechRequest, SpeechSynthesizer};
use reqwest::Client;
use tracing::{debug, instrument};

/// Speech synthesis without provider timings.
///
/// The endpoint returns audio only, so duration is estimated from a
/// speaking rate and word timings are spread evenly across it.
#[derive(Debug, Clone)]
pub struct OpenAiSpeechSynthesizer {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    voice: String,
    encoding: String,
    chars_per_second: f64,
}

impl OpenAiSpeechSynthesizer {
    /// Create a synthesizer from `[providers.speech]`.
    pub fn from_config(config: &SpeechProviderConfig) -> ReelsmithResult<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key(),
            model: config.model.clone().unwrap_or_else(|| "tts-1".to_string()),
            voice: config.voice.clone(),
            encoding: config.encoding.clone(),
            chars_per_second: config.chars_per_second,
        })
    }

    /// Estimated spoken length of `text` at `speed_ratio`.
    pub fn estimate_duration(&self, text: &str, speed_ratio: f32) -> f64 {
        let chars = text.chars().filter(|c| !c.is_whitespace()).count() as f64;
        let rate = self.chars_per_second * f64::from(speed_ratio.max(0.1));
        chars / rate
    }

    fn mime_type(&self) -> String {
        match self.encoding.as_str() {
            "mp3" => "audio/mpeg".to_string(),
            "wav" => "audio/wav".to_string(),
            "opus" => "audio/ogg".to_string(),
            other => format!("audio/{}", other),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeechSynthesizer {
    #[instrument(skip(self, request), fields(provider = "openai", chars = request.text.chars().count()))]
    async fn synthesize(&self, request: &SpeechRequest) -> ReelsmithResult<SpeechOutput> {
        if request.text.trim().is_empty() {
            return Err(ProviderError::new(ProviderErrorKind::InvalidRequest(
                "speech text is empty".to_string(),
            ))
            .into());
        }
        let body = SpeechGenerationRequest {
            model: &self.model,
            input: &request.text,
            voice: &self.voice,
            speed: request.speed_ratio,
            response_format: &self.encoding,
        };
        let mut builder = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await.map_err(transport)?;
        let audio = read_bytes(response).await?;

        let duration_secs = self.estimate_duration(&request.text, request.speed_ratio);
        let word_timings = reelsmith_text::estimate_word_timings(&request.text, duration_secs);
        debug!(bytes = audio.len(), duration_secs, "Synthesized speech");

        Ok(SpeechOutput {
            audio,
            mime_type: self.mime_type(),
            duration_secs,
            word_timings,
        })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
