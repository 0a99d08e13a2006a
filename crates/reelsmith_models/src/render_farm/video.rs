//! Image-to-video on the render farm.

use super::workflow::{WorkflowTemplate, random_seed};
use crate::http::mime_from_filename;
use async_trait::async_trait;
use reelsmith_config::{EndpointSettings, JobTimingConfig, VideoProviderConfig};
use reelsmith_error::{ConfigError, ProviderError, ProviderErrorKind, ReelsmithResult};
use reelsmith_interface::{CancellationToken, GeneratedMedia, VideoGenerator, VideoRequest};
use reelsmith_jobs::{JobClientConfig, RenderFarmClient};
use serde_json::json;
use tracing::{info, instrument};

const MAX_DURATION_SECS: u32 = 12;
const FRAMES_PER_SECOND: u32 = 16;

/// Video generation from a user-supplied image-to-video workflow.
///
/// Placeholders: `{{prompt}}`, `{{image_data_url}}`, `{{image_base64}}`,
/// `{{duration}}`, `{{frames}}`, `{{filename_prefix}}` and `{{seed}}`.
#[derive(Debug, Clone)]
pub struct RenderFarmVideoGenerator {
    client: RenderFarmClient,
    template: WorkflowTemplate,
}

impl RenderFarmVideoGenerator {
    /// Create a generator with explicit settings.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        template: WorkflowTemplate,
        config: JobClientConfig,
    ) -> ReelsmithResult<Self> {
        Ok(Self {
            client: RenderFarmClient::new(base_url, api_key, config)?,
            template,
        })
    }

    /// Create a generator from `[providers.video]` and `[jobs]`.
    ///
    /// # Errors
    ///
    /// Returns an error if `workflow_path` is unset or unreadable.
    pub fn from_config(
        config: &VideoProviderConfig,
        timing: &JobTimingConfig,
    ) -> ReelsmithResult<Self> {
        let path = config.workflow_path.as_ref().ok_or_else(|| {
            ConfigError::new("providers.video.workflow_path is required for the render_farm backend")
        })?;
        let template = WorkflowTemplate::load(path)?;
        let job_config = crate::job_client_config(timing, config.max_wait_secs)?;
        Self::new(&config.base_url, config.api_key(), template, job_config)
    }
}

#[async_trait]
impl VideoGenerator for RenderFarmVideoGenerator {
    #[instrument(skip(self, request, cancel), fields(provider = "render_farm", duration = request.duration_secs))]
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
        let image_base64 = request
            .image_data_url
            .split_once(";base64,")
            .map(|(_, data)| data)
            .unwrap_or(&request.image_data_url);

        let workflow = self.template.render(&[
            ("prompt", json!(request.prompt)),
            ("image_data_url", json!(request.image_data_url)),
            ("image_base64", json!(image_base64)),
            ("duration", json!(request.duration_secs)),
            ("frames", json!(request.duration_secs * FRAMES_PER_SECOND + 1)),
            ("filename_prefix", json!("reelsmith/clip")),
            ("seed", json!(random_seed())),
        ]);
        let handle = self.client.submit_workflow(&workflow).await?;
        let output = self.client.wait_for_output_filename(&handle, cancel).await?;
        let data = self.client.download(&output).await?;

        let mime_type = output
            .filename
            .as_deref()
            .map(mime_from_filename)
            .unwrap_or("video/mp4");
        info!(job_id = %output.job_id, bytes = data.len(), "Video workflow finished");
        Ok(GeneratedMedia::new(data, mime_type))
    }

    fn provider_name(&self) -> &'static str {
        "render_farm"
    }

    fn max_duration_secs(&self) -> u32 {
        MAX_DURATION_SECS
    }
}
