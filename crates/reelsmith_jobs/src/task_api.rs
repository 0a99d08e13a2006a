//! Task-style video generation API dialect.
//!
//! Submit: `POST /contents/generations/tasks` → `{"id": ...}`.
//! Status: `GET /contents/generations/tasks/{id}` →
//! `{"status": "queued" | "running" | "succeeded" | "failed", "content": {"video_url": ...}}`.

use crate::{JobDialect, JobOutput, JobStatus};
use serde_json::Value;

const TASKS_PATH: &str = "/contents/generations/tasks";

/// Dialect for task-based image-to-video APIs.
#[derive(Debug, Clone, Default)]
pub struct TaskApiDialect {
    fallback: Option<String>,
}

impl TaskApiDialect {
    /// Dialect without a fallback submit path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also try `path` when the task endpoint is missing.
    pub fn with_fallback(mut self, path: impl Into<String>) -> Self {
        self.fallback = Some(path.into());
        self
    }
}

impl JobDialect for TaskApiDialect {
    fn name(&self) -> &'static str {
        "task_api"
    }

    fn submit_path(&self) -> &str {
        TASKS_PATH
    }

    fn fallback_submit_path(&self) -> Option<&str> {
        self.fallback.as_deref()
    }

    fn parse_job_id(&self, body: &Value) -> Option<String> {
        body.get("id")
            .or_else(|| body.pointer("/data/id"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }

    fn status_path(&self, job_id: &str) -> String {
        format!("{}/{}", TASKS_PATH, job_id)
    }

    fn interpret_status(&self, _base_url: &str, job_id: &str, body: &Value) -> JobStatus {
        let status = body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_ascii_lowercase();
        match status.as_str() {
            "succeeded" | "completed" => {
                let output = body
                    .pointer("/content/video_url")
                    .and_then(Value::as_str)
                    .filter(|url| !url.is_empty())
                    .map(|url| JobOutput {
                        job_id: job_id.to_string(),
                        filename: None,
                        download_url: url.to_string(),
                    });
                JobStatus::Completed(output)
            }
            "failed" | "cancelled" | "expired" => {
                let message = body
                    .pointer("/error/message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("task {}", status));
                JobStatus::Failed(message)
            }
            _ => JobStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_succeeded_without_url_has_no_output() {
        let dialect = TaskApiDialect::new();
        let status = dialect.interpret_status("", "t1", &json!({"status": "succeeded"}));
        assert_eq!(status, JobStatus::Completed(None));
    }

    #[test]
    fn test_unknown_status_is_pending() {
        let dialect = TaskApiDialect::new();
        assert_eq!(
            dialect.interpret_status("", "t1", &json!({"weird": true})),
            JobStatus::Pending
        );
    }

    #[test]
    fn test_failure_message_extracted() {
        let dialect = TaskApiDialect::new();
        let body = json!({"status": "failed", "error": {"message": "image rejected"}});
        assert_eq!(
            dialect.interpret_status("", "t1", &body),
            JobStatus::Failed("image rejected".to_string())
        );
    }
}
