//! Image-to-video through the content generation task API.

use async_trait::async_trait;
use reelsmith_config::{EndpointSettings, JobTimingConfig, VideoProviderConfig};
use reelsmith_error::{ProviderError, ProviderErrorKind, ReelsmithResult};
use reelsmith_interface::{CancellationToken, GeneratedMedia, VideoGenerator, VideoRequest};
use reelsmith_jobs::{JobClient, JobClientConfig, TaskApiDialect};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, instrument};

const MAX_DURATION_SECS: u32 = 12;

/// Video generation through the task API.
///
/// Submits `{model, content, ratio, duration, watermark}` and returns the
/// downloaded clip once the task succeeds.
#[derive(Debug, Clone)]
pub struct TaskApiVideoGenerator {
    jobs: JobClient,
    model: String,
    ratio: String,
    watermark: bool,
}

impl TaskApiVideoGenerator {
    /// Create a generator with explicit settings.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        config: JobClientConfig,
    ) -> ReelsmithResult<Self> {
        Self::with_dialect(base_url, api_key, model, TaskApiDialect::new(), config)
    }

    /// Create a generator speaking a customized task dialect.
    pub fn with_dialect(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        dialect: TaskApiDialect,
        config: JobClientConfig,
    ) -> ReelsmithResult<Self> {
        let jobs = JobClient::new(base_url, api_key, Arc::new(dialect), config)?;
        Ok(Self {
            jobs,
            model: model.into(),
            ratio: "9:16".to_string(),
            watermark: false,
        })
    }

    /// Create a generator from `[providers.video]` and `[jobs]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key variable is unset.
    pub fn from_config(
        config: &VideoProviderConfig,
        timing: &JobTimingConfig,
    ) -> ReelsmithResult<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            ProviderError::new(ProviderErrorKind::MissingApiKey(
                config
                    .api_key_env
                    .clone()
                    .unwrap_or_else(|| "providers.video.api_key_env".to_string()),
            ))
        })?;
        let job_config = crate::job_client_config(timing, config.max_wait_secs)?;
        let dialect = match &config.fallback_path {
            Some(fallback) => TaskApiDialect::new().with_fallback(fallback),
            None => TaskApiDialect::new(),
        };
        let mut generator = Self::with_dialect(
            &config.base_url,
            Some(api_key),
            &config.model,
            dialect,
            job_config,
        )?;
        generator.ratio = config.ratio.clone();
        generator.watermark = config.watermark;
        Ok(generator)
    }

    fn body(&self, request: &VideoRequest) -> Value {
        json!({
            "model": self.model,
            "content": [
                { "type": "text", "text": request.prompt },
                { "type": "image_url", "image_url": { "url": request.image_data_url } },
            ],
            "ratio": self.ratio,
            "duration": request.duration_secs,
            "watermark": self.watermark,
        })
    }
}

#[async_trait]
impl VideoGenerator for TaskApiVideoGenerator {
    #[instrument(skip(self, request, cancel), fields(provider = "task_api", model = %self.model, duration = request.duration_secs))]
    async fn generate_video(
        &self,
        request: &VideoRequest,
        cancel: &CancellationToken,
    ) -> ReelsmithResult<GeneratedMedia> {
        if request.duration_secs == 0 || request.duration_secs > MAX_DURATION_SECS {
            return Err(ProviderError::new(ProviderErrorKind::InvalidRequest(format!(
                "duration must be 1..={} seconds, got {}",
                MAX_DURATION_SECS, request.duration_secs
            )))
            .into());
        }
        let (output, data) = self.jobs.run(&self.body(request), cancel).await?;
        info!(job_id = %output.job_id, bytes = data.len(), "Video task finished");
        Ok(GeneratedMedia::new(data, "video/mp4"))
    }

    fn provider_name(&self) -> &'static str {
        "task_api"
    }

    fn max_duration_secs(&self) -> u32 {
        MAX_DURATION_SECS
    }
}
