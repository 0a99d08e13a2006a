//! Provider-specific job response shapes.

use serde_json::Value;

/// Where a finished job's output can be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutput {
    /// Provider job id
    pub job_id: String,
    /// Output filename, when the provider names one
    pub filename: Option<String>,
    /// Absolute download URL
    pub download_url: String,
}

/// Interpreted job status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Queued or running
    Pending,
    /// Finished; `None` when the response named no output
    Completed(Option<JobOutput>),
    /// Provider reported failure
    Failed(String),
}

impl JobStatus {
    /// Whether polling can stop.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

/// Describes one provider's job endpoints and response shapes.
///
/// Parsing is fail-soft: unexpected shapes map to `Pending` or to a
/// completed job without output, never to a panic.
pub trait JobDialect: Send + Sync + std::fmt::Debug {
    /// Dialect name for logs.
    fn name(&self) -> &'static str;

    /// Preferred submit path, relative to the base URL.
    fn submit_path(&self) -> &str;

    /// Alternative submit path tried when the preferred one is 404/405.
    fn fallback_submit_path(&self) -> Option<&str>;

    /// Extract the job id from a submit response.
    fn parse_job_id(&self, body: &Value) -> Option<String>;

    /// Status path for a job, relative to the base URL.
    fn status_path(&self, job_id: &str) -> String;

    /// Interpret a status response.
    fn interpret_status(&self, base_url: &str, job_id: &str, body: &Value) -> JobStatus;
}
