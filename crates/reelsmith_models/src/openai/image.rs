//! OpenAI-compatible `/images/generations`.

use super::dto::{ImageGenerationRequest, ImageGenerationResponse};
use crate::http::{decode_base64, http_client, read_bytes, read_json, transport};
use async_trait::async_trait;
use reelsmith_config::{EndpointSettings, ImageProviderConfig};
use reelsmith_error::{JobError, JobErrorKind, ProviderError, ProviderErrorKind, ReelsmithResult};
use reelsmith_interface::{CancellationToken, GeneratedMedia, ImageGenerator, ImageRequest};
use reqwest::Client;
use tracing::{debug, instrument};

/// Synchronous image generation.
///
/// Accepts either inline base64 (`b64_json`) or a URL in the response; URLs
/// are fetched without credentials.
#[derive(Debug, Clone)]
pub struct OpenAiImageGenerator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: Option<String>,
    size: String,
}

impl OpenAiImageGenerator {
    /// Create a generator with explicit settings.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: Option<String>,
        size: impl Into<String>,
    ) -> ReelsmithResult<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model,
            size: size.into(),
        })
    }

    /// Create a generator from `[providers.image]`.
    pub fn from_config(config: &ImageProviderConfig) -> ReelsmithResult<Self> {
        Self::new(
            &config.base_url,
            config.api_key(),
            config.model.clone(),
            &config.size,
        )
    }

    async fn request(&self, prompt: &str) -> ReelsmithResult<GeneratedMedia> {
        let body = ImageGenerationRequest {
            model: self.model.as_deref(),
            prompt,
            n: 1,
            size: &self.size,
            response_format: "b64_json",
        };
        let mut builder = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await.map_err(transport)?;
        let parsed: ImageGenerationResponse = read_json(response).await?;

        let Some(image) = parsed.data.into_iter().next() else {
            return Err(ProviderError::new(ProviderErrorKind::EmptyResponse(
                "no images in response".to_string(),
            ))
            .into());
        };

        if let Some(b64) = image.b64_json {
            return Ok(GeneratedMedia::new(decode_base64(&b64)?, "image/png"));
        }
        if let Some(url) = image.url {
            debug!(url = %url, "Fetching generated image");
            let response = self.client.get(&url).send().await.map_err(transport)?;
            let mime_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("image/png")
                .to_string();
            return Ok(GeneratedMedia::new(read_bytes(response).await?, mime_type));
        }
        Err(ProviderError::new(ProviderErrorKind::InvalidResponse(
            "image entry has neither b64_json nor url".to_string(),
        ))
        .into())
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    #[instrument(skip(self, request, cancel), fields(provider = "openai", hint = %request.filename_hint))]
    async fn generate_image(
        &self,
        request: &ImageRequest,
        cancel: &CancellationToken,
    ) -> ReelsmithResult<GeneratedMedia> {
        tokio::select! {
            _ = cancel.cancelled() => {
                Err(JobError::new(JobErrorKind::Cancelled(request.filename_hint.clone())).into())
            }
            result = self.request(&request.prompt) => result,
        }
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
