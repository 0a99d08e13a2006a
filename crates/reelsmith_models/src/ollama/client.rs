//! Ollama `/api/generate` client.

use crate::http::{http_client, read_json, transport};
use async_trait::async_trait;
use reelsmith_config::TextProviderConfig;
use reelsmith_error::{ProviderError, ProviderErrorKind, ReelsmithResult};
use reelsmith_interface::{TextGenerator, TextRequest, TextResponse, TokenUsage};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    #[serde(default)]
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Text generation against a local Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaTextGenerator {
    client: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OllamaTextGenerator {
    /// Create a generator for `model` on the server at `base_url`.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> ReelsmithResult<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            max_tokens: 4096,
            temperature: 0.7,
        })
    }

    /// Create a generator from `[providers.text]`.
    pub fn from_config(config: &TextProviderConfig) -> ReelsmithResult<Self> {
        let mut generator = Self::new(&config.base_url, &config.model)?;
        generator.max_tokens = config.max_tokens;
        generator.temperature = config.temperature;
        Ok(generator)
    }
}

#[async_trait]
impl TextGenerator for OllamaTextGenerator {
    #[instrument(skip(self, request), fields(provider = "ollama", model = %self.model))]
    async fn generate_text(&self, request: &TextRequest) -> ReelsmithResult<TextResponse> {
        let body = GenerateBody {
            model: &self.model,
            prompt: &request.prompt,
            system: request.system.as_deref(),
            stream: false,
            options: GenerateOptions {
                num_predict: request.max_tokens.unwrap_or(self.max_tokens),
                temperature: request.temperature.unwrap_or(self.temperature),
            },
        };
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let reply: GenerateReply = read_json(response).await?;

        if reply.response.trim().is_empty() {
            return Err(ProviderError::new(ProviderErrorKind::EmptyResponse(
                "ollama returned an empty response".to_string(),
            ))
            .into());
        }
        let usage = match (reply.prompt_eval_count, reply.eval_count) {
            (Some(prompt), Some(completion)) => Some(TokenUsage {
                prompt_tokens: prompt,
                completion_tokens: completion,
                total_tokens: prompt + completion,
            }),
            _ => None,
        };
        debug!(chars = reply.response.chars().count(), "Received completion");

        Ok(TextResponse {
            text: reply.response,
            usage,
        })
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
