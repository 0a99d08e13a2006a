//! Capability traits implemented by provider backends.

use crate::{
    GeneratedMedia, ImageRequest, SpeechOutput, SpeechRequest, TextRequest, TextResponse,
    VideoRequest,
};
use async_trait::async_trait;
use reelsmith_error::ReelsmithResult;
use tokio_util::sync::CancellationToken;

/// Synchronous text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a prompt.
    async fn generate_text(&self, request: &TextRequest) -> ReelsmithResult<TextResponse>;

    /// Provider name (e.g., "openai", "ollama").
    fn provider_name(&self) -> &'static str;

    /// Model identifier.
    fn model_name(&self) -> &str;
}

/// Still-image generation.
///
/// Job-based backends only return once the job resolves; `cancel` aborts
/// the wait.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate one image.
    async fn generate_image(
        &self,
        request: &ImageRequest,
        cancel: &CancellationToken,
    ) -> ReelsmithResult<GeneratedMedia>;

    /// Provider name.
    fn provider_name(&self) -> &'static str;
}

/// Speech synthesis with word timings.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize speech for `request.text`.
    async fn synthesize(&self, request: &SpeechRequest) -> ReelsmithResult<SpeechOutput>;

    /// Provider name.
    fn provider_name(&self) -> &'static str;
}

/// Image-to-video generation. Always job-based.
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    /// Generate a clip from a still image.
    async fn generate_video(
        &self,
        request: &VideoRequest,
        cancel: &CancellationToken,
    ) -> ReelsmithResult<GeneratedMedia>;

    /// Provider name.
    fn provider_name(&self) -> &'static str;

    /// Longest clip the backend accepts, in seconds.
    fn max_duration_secs(&self) -> u32 {
        12
    }
}
