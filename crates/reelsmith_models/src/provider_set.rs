//! Backend selection from configuration.

use crate::{
    FrontendSpeechSynthesizer, OllamaTextGenerator, OpenAiImageGenerator,
    OpenAiSpeechSynthesizer, OpenAiTextGenerator, RenderFarmImageGenerator,
    RenderFarmVideoGenerator, TaskApiVideoGenerator, Throttle, Throttled,
};
use reelsmith_config::{
    EndpointSettings, ImageBackend, ProviderLimits, ReelsmithConfig, SpeechBackend, TextBackend,
    VideoBackend,
};
use reelsmith_error::ReelsmithResult;
use reelsmith_interface::{ImageGenerator, SpeechSynthesizer, TextGenerator, VideoGenerator};
use std::sync::Arc;
use tracing::{info, instrument};

/// The four capability backends the orchestrator works with.
#[derive(Clone)]
pub struct ProviderSet {
    /// Text generation
    pub text: Arc<dyn TextGenerator>,
    /// Image generation
    pub image: Arc<dyn ImageGenerator>,
    /// Speech synthesis
    pub speech: Arc<dyn SpeechSynthesizer>,
    /// Video generation
    pub video: Arc<dyn VideoGenerator>,
}

impl std::fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSet")
            .field("text", &self.text.provider_name())
            .field("image", &self.image.provider_name())
            .field("speech", &self.speech.provider_name())
            .field("video", &self.video.provider_name())
            .finish()
    }
}

fn throttled<G: ?Sized>(inner: Arc<G>, limits: ProviderLimits) -> Option<Throttled<G>> {
    (!limits.is_unlimited()).then(|| Throttled::new(inner, Throttle::new(limits)))
}

impl ProviderSet {
    /// Construct every backend selected in `[providers]`.
    ///
    /// Backends with `limits` configured are wrapped in a [`Throttled`].
    ///
    /// # Errors
    ///
    /// Returns an error if a required API key is missing or a workflow
    /// template cannot be loaded.
    #[instrument(skip(config))]
    pub fn from_config(config: &ReelsmithConfig) -> ReelsmithResult<Self> {
        let providers = &config.providers;

        let text: Arc<dyn TextGenerator> = match providers.text.backend {
            TextBackend::OpenAi => Arc::new(OpenAiTextGenerator::from_config(&providers.text)?),
            TextBackend::Ollama => Arc::new(OllamaTextGenerator::from_config(&providers.text)?),
        };
        let text = match throttled(text.clone(), providers.text.limits()) {
            Some(wrapped) => Arc::new(wrapped) as Arc<dyn TextGenerator>,
            None => text,
        };

        let image: Arc<dyn ImageGenerator> = match providers.image.backend {
            ImageBackend::OpenAi => Arc::new(OpenAiImageGenerator::from_config(&providers.image)?),
            ImageBackend::RenderFarm => Arc::new(RenderFarmImageGenerator::from_config(
                &providers.image,
                &config.jobs,
            )?),
        };
        let image = match throttled(image.clone(), providers.image.limits()) {
            Some(wrapped) => Arc::new(wrapped) as Arc<dyn ImageGenerator>,
            None => image,
        };

        let speech: Arc<dyn SpeechSynthesizer> = match providers.speech.backend {
            SpeechBackend::Frontend => {
                Arc::new(FrontendSpeechSynthesizer::from_config(&providers.speech)?)
            }
            SpeechBackend::OpenAi => {
                Arc::new(OpenAiSpeechSynthesizer::from_config(&providers.speech)?)
            }
        };
        let speech = match throttled(speech.clone(), providers.speech.limits()) {
            Some(wrapped) => Arc::new(wrapped) as Arc<dyn SpeechSynthesizer>,
            None => speech,
        };

        let video: Arc<dyn VideoGenerator> = match providers.video.backend {
            VideoBackend::TaskApi => Arc::new(TaskApiVideoGenerator::from_config(
                &providers.video,
                &config.jobs,
            )?),
            VideoBackend::RenderFarm => Arc::new(RenderFarmVideoGenerator::from_config(
                &providers.video,
                &config.jobs,
            )?),
        };
        let video = match throttled(video.clone(), providers.video.limits()) {
            Some(wrapped) => Arc::new(wrapped) as Arc<dyn VideoGenerator>,
            None => video,
        };

        let set = Self {
            text,
            image,
            speech,
            video,
        };
        info!(providers = ?set, "Provider backends ready");
        Ok(set)
    }
}
