//! OpenAI-compatible chat completions.

use super::dto::{ChatMessage, ChatRequest, ChatResponse};
use crate::http::{http_client, read_json, transport};
use async_trait::async_trait;
use reelsmith_config::{EndpointSettings, TextProviderConfig};
use reelsmith_error::{ProviderError, ProviderErrorKind, ReelsmithResult};
use reelsmith_interface::{TextGenerator, TextRequest, TextResponse, TokenUsage};
use reqwest::Client;
use tracing::{debug, instrument};

/// Text generation against any `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiTextGenerator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiTextGenerator {
    /// Create a generator with explicit settings.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> ReelsmithResult<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            max_tokens: 4096,
            temperature: 0.7,
        })
    }

    /// Create a generator from `[providers.text]`.
    pub fn from_config(config: &TextProviderConfig) -> ReelsmithResult<Self> {
        let mut generator = Self::new(&config.base_url, config.api_key(), &config.model)?;
        generator.max_tokens = config.max_tokens;
        generator.temperature = config.temperature;
        Ok(generator)
    }
}

#[async_trait]
impl TextGenerator for OpenAiTextGenerator {
    #[instrument(skip(self, request), fields(provider = "openai", model = %self.model, prompt_len = request.prompt.len()))]
    async fn generate_text(&self, request: &TextRequest) -> ReelsmithResult<TextResponse> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });
        let body = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: request.max_tokens.unwrap_or(self.max_tokens),
            temperature: request.temperature.unwrap_or(self.temperature),
        };

        let url = format!("{}/chat/completions", self.base_url);
        let mut builder = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await.map_err(transport)?;
        let parsed: ChatResponse = read_json(response).await?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::new(ProviderErrorKind::EmptyResponse(
                    "no message content in choices".to_string(),
                ))
            })?;
        let usage = parsed.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        debug!(chars = text.chars().count(), ?usage, "Received completion");

        Ok(TextResponse { text, usage })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
