//! Text-to-image on the render farm.

use super::workflow::{WorkflowTemplate, random_seed};
use crate::http::mime_from_filename;
use async_trait::async_trait;
use reelsmith_config::{EndpointSettings, ImageProviderConfig, JobTimingConfig};
use reelsmith_error::ReelsmithResult;
use reelsmith_interface::{CancellationToken, GeneratedMedia, ImageGenerator, ImageRequest};
use reelsmith_jobs::{JobClientConfig, RenderFarmClient};
use serde_json::json;
use tracing::{info, instrument};

/// Image generation by queueing a workflow and downloading its first output.
#[derive(Debug, Clone)]
pub struct RenderFarmImageGenerator {
    client: RenderFarmClient,
    template: WorkflowTemplate,
}

impl RenderFarmImageGenerator {
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

    /// Create a generator from `[providers.image]` and `[jobs]`.
    ///
    /// Uses the built-in text-to-image graph unless `workflow_path` is set.
    pub fn from_config(
        config: &ImageProviderConfig,
        timing: &JobTimingConfig,
    ) -> ReelsmithResult<Self> {
        let template = match &config.workflow_path {
            Some(path) => WorkflowTemplate::load(path)?,
            None => WorkflowTemplate::default_image()?,
        };
        let job_config = crate::job_client_config(timing, config.max_wait_secs)?;
        Self::new(&config.base_url, config.api_key(), template, job_config)
    }
}

#[async_trait]
impl ImageGenerator for RenderFarmImageGenerator {
    #[instrument(skip(self, request, cancel), fields(provider = "render_farm", hint = %request.filename_hint))]
    async fn generate_image(
        &self,
        request: &ImageRequest,
        cancel: &CancellationToken,
    ) -> ReelsmithResult<GeneratedMedia> {
        let workflow = self.template.render(&[
            ("prompt", json!(request.prompt)),
            ("filename_prefix", json!(request.filename_hint)),
            ("seed", json!(random_seed())),
        ]);
        let handle = self.client.submit_workflow(&workflow).await?;
        let output = self.client.wait_for_output_filename(&handle, cancel).await?;
        let data = self.client.download(&output).await?;

        let mime_type = output
            .filename
            .as_deref()
            .map(mime_from_filename)
            .unwrap_or("image/png");
        info!(job_id = %output.job_id, bytes = data.len(), "Image workflow finished");
        Ok(GeneratedMedia::new(data, mime_type))
    }

    fn provider_name(&self) -> &'static str {
        "render_farm"
    }
}
