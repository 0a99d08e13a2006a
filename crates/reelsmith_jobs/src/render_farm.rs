//! Node-graph render farm dialect and convenience client.
//!
//! Submit: `POST /prompt` (fallback `/api/prompt`) with
//! `{"prompt": <workflow>, "client_id": ...}` → `{"prompt_id": ...}`.
//! Status: `GET /history/{prompt_id}` → `{}` until done, then
//! `{"<id>": {"status": {...}, "outputs": {"<node>": {"images": [{filename, subfolder, type}]}}}}`.
//! Download: `GET /view?filename=&subfolder=&type=`.

use crate::{JobClient, JobClientConfig, JobDialect, JobHandle, JobOutput, JobStatus};
use reelsmith_error::ReelsmithResult;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

const OUTPUT_KEYS: &[&str] = &["images", "gifs", "videos"];

/// Dialect for node-graph render servers.
#[derive(Debug, Clone)]
pub struct RenderFarmDialect {
    submit_path: String,
    fallback_path: Option<String>,
}

impl Default for RenderFarmDialect {
    fn default() -> Self {
        Self {
            submit_path: "/prompt".to_string(),
            fallback_path: Some("/api/prompt".to_string()),
        }
    }
}

impl RenderFarmDialect {
    /// Standard `/prompt` with `/api/prompt` fallback.
    pub fn new() -> Self {
        Self::default()
    }

    fn first_output(outputs: &serde_json::Map<String, Value>) -> Option<(&str, &str, &str)> {
        // serde_json maps iterate in key order, so node choice is stable.
        outputs.values().find_map(|node| {
            OUTPUT_KEYS.iter().find_map(|key| {
                node.get(*key)?.as_array()?.iter().find_map(|file| {
                    let filename = file.get("filename")?.as_str()?;
                    let subfolder = file.get("subfolder").and_then(Value::as_str).unwrap_or("");
                    let kind = file.get("type").and_then(Value::as_str).unwrap_or("output");
                    Some((filename, subfolder, kind))
                })
            })
        })
    }
}

impl JobDialect for RenderFarmDialect {
    fn name(&self) -> &'static str {
        "render_farm"
    }

    fn submit_path(&self) -> &str {
        &self.submit_path
    }

    fn fallback_submit_path(&self) -> Option<&str> {
        self.fallback_path.as_deref()
    }

    fn parse_job_id(&self, body: &Value) -> Option<String> {
        body.get("prompt_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }

    fn status_path(&self, job_id: &str) -> String {
        format!("/history/{}", job_id)
    }

    fn interpret_status(&self, base_url: &str, job_id: &str, body: &Value) -> JobStatus {
        let Some(entry) = body.get(job_id) else {
            return JobStatus::Pending;
        };

        if let Some(status) = entry.get("status")
            && status.get("status_str").and_then(Value::as_str) == Some("error")
        {
            let message = status
                .get("messages")
                .and_then(Value::as_array)
                .and_then(|messages| {
                    messages.iter().rev().find_map(|m| {
                        m.pointer("/1/exception_message").and_then(Value::as_str)
                    })
                })
                .unwrap_or("workflow execution error");
            return JobStatus::Failed(message.to_string());
        }

        let found = entry
            .get("outputs")
            .and_then(Value::as_object)
            .and_then(Self::first_output);
        match found {
            Some((filename, subfolder, kind)) => {
                let Ok(mut url) = reqwest::Url::parse(&format!("{}/view", base_url)) else {
                    return JobStatus::Completed(None);
                };
                url.query_pairs_mut()
                    .append_pair("filename", filename)
                    .append_pair("subfolder", subfolder)
                    .append_pair("type", kind);
                JobStatus::Completed(Some(JobOutput {
                    job_id: job_id.to_string(),
                    filename: Some(filename.to_string()),
                    download_url: url.to_string(),
                }))
            }
            None => {
                let completed = entry
                    .pointer("/status/completed")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                if completed {
                    JobStatus::Completed(None)
                } else {
                    JobStatus::Pending
                }
            }
        }
    }
}

/// Render farm client that wraps workflows in the submit envelope.
#[derive(Debug, Clone)]
pub struct RenderFarmClient {
    jobs: JobClient,
    client_id: String,
}

impl RenderFarmClient {
    /// Create a client for the render server at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        config: JobClientConfig,
    ) -> ReelsmithResult<Self> {
        let jobs = JobClient::new(base_url, api_key, Arc::new(RenderFarmDialect::new()), config)?;
        Ok(Self {
            jobs,
            client_id: uuid::Uuid::new_v4().to_string(),
        })
    }

    /// Underlying job client.
    pub fn jobs(&self) -> &JobClient {
        &self.jobs
    }

    /// Submit a workflow graph and return its job handle.
    #[instrument(skip(self, workflow))]
    pub async fn submit_workflow(&self, workflow: &Value) -> ReelsmithResult<JobHandle> {
        let body = json!({ "prompt": workflow, "client_id": self.client_id });
        let handle = self.jobs.submit(&body).await?;
        debug!(job_id = %handle.job_id(), "Workflow queued");
        Ok(handle)
    }

    /// Wait for the workflow's first output file.
    pub async fn wait_for_output_filename(
        &self,
        handle: &JobHandle,
        cancel: &CancellationToken,
    ) -> ReelsmithResult<JobOutput> {
        self.jobs.await_output(handle, cancel).await
    }

    /// Download an output file.
    pub async fn download(&self, output: &JobOutput) -> ReelsmithResult<Vec<u8>> {
        self.jobs.download(output).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_is_pending() {
        let dialect = RenderFarmDialect::new();
        assert_eq!(
            dialect.interpret_status("http://farm", "abc", &json!({})),
            JobStatus::Pending
        );
    }

    #[test]
    fn test_output_url_is_encoded() {
        let dialect = RenderFarmDialect::new();
        let body = json!({
            "abc": {"outputs": {"9": {"images": [
                {"filename": "shot 1_00001_.png", "subfolder": "", "type": "output"}
            ]}}}
        });
        let JobStatus::Completed(Some(output)) =
            dialect.interpret_status("http://farm:8188", "abc", &body)
        else {
            panic!("expected output");
        };
        assert_eq!(output.filename.as_deref(), Some("shot 1_00001_.png"));
        assert_eq!(
            output.download_url,
            "http://farm:8188/view?filename=shot+1_00001_.png&subfolder=&type=output"
        );
    }

    #[test]
    fn test_error_status_reports_exception() {
        let dialect = RenderFarmDialect::new();
        let body = json!({
            "abc": {"status": {"status_str": "error", "completed": false, "messages": [
                ["execution_start", {}],
                ["execution_error", {"exception_message": "CUDA out of memory"}]
            ]}, "outputs": {}}
        });
        assert_eq!(
            dialect.interpret_status("http://farm", "abc", &body),
            JobStatus::Failed("CUDA out of memory".to_string())
        );
    }

    #[test]
    fn test_completed_without_files() {
        let dialect = RenderFarmDialect::new();
        let body = json!({"abc": {"status": {"status_str": "success", "completed": true}, "outputs": {}}});
        assert_eq!(
            dialect.interpret_status("http://farm", "abc", &body),
            JobStatus::Completed(None)
        );
    }
}
