//! Generic submit/poll/download job client.

use crate::{JobClientConfig, JobDialect, JobOutput, JobStatus};
use reelsmith_error::{JobError, JobErrorKind, ReelsmithResult};
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio_retry2::{Retry, RetryError, strategy::FixedInterval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Opaque handle to a submitted job.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct JobHandle {
    /// Provider job id
    job_id: String,
    /// Submit URL that accepted the job
    endpoint: String,
}

impl JobHandle {
    /// Handle for a job submitted elsewhere.
    pub fn new(job_id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            endpoint: endpoint.into(),
        }
    }
}

/// Stateless client for one job-based provider.
///
/// Cloning is cheap; clones share the HTTP connection pool.
#[derive(Debug, Clone)]
pub struct JobClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    dialect: Arc<dyn JobDialect>,
    config: JobClientConfig,
}

enum SubmitResponse {
    Accepted(JobHandle),
    Missing,
}

impl JobClient {
    /// Create a client for `base_url` speaking `dialect`.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        dialect: Arc<dyn JobDialect>,
        config: JobClientConfig,
    ) -> ReelsmithResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(*config.request_timeout())
            .build()
            .map_err(|e| JobError::new(JobErrorKind::Transport(e.to_string())))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            dialect,
            config,
        })
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Timing configuration.
    pub fn config(&self) -> &JobClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Submit a job description.
    ///
    /// Each attempt posts to the preferred endpoint and, if that answers
    /// 404/405, to the fallback endpoint. Transport errors, 5xx responses and
    /// "both endpoints missing" are retried after a fixed delay up to the
    /// configured attempt count; other 4xx responses fail at once.
    #[instrument(skip(self, body), fields(dialect = self.dialect.name()))]
    pub async fn submit(&self, body: &Value) -> ReelsmithResult<JobHandle> {
        let retries = self.config.submit_attempts().saturating_sub(1) as usize;
        let strategy = FixedInterval::new(*self.config.submit_delay()).take(retries);

        let handle = Retry::spawn(strategy, || async move {
            match self.submit_once(body).await {
                Ok(handle) => Ok(handle),
                Err(e) if e.kind.is_retryable() => {
                    warn!(error = %e, "Job submission failed, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => {
                    warn!(error = %e, "Job submission rejected");
                    Err(RetryError::Permanent(e))
                }
            }
        })
        .await?;

        info!(job_id = %handle.job_id, endpoint = %handle.endpoint, "Job submitted");
        Ok(handle)
    }

    async fn submit_once(&self, body: &Value) -> Result<JobHandle, JobError> {
        let primary = self.url(self.dialect.submit_path());
        if let SubmitResponse::Accepted(handle) = self.post_job(&primary, body).await? {
            return Ok(handle);
        }

        let Some(fallback_path) = self.dialect.fallback_submit_path() else {
            return Err(JobError::new(JobErrorKind::EndpointNotFound {
                primary,
                fallback: "(none)".to_string(),
            }));
        };
        let fallback = self.url(fallback_path);
        debug!(primary = %primary, fallback = %fallback, "Primary submit endpoint missing, trying fallback");
        match self.post_job(&fallback, body).await? {
            SubmitResponse::Accepted(handle) => Ok(handle),
            SubmitResponse::Missing => Err(JobError::new(JobErrorKind::EndpointNotFound {
                primary,
                fallback,
            })),
        }
    }

    async fn post_job(&self, url: &str, body: &Value) -> Result<SubmitResponse, JobError> {
        let response = self
            .authorize(self.http.post(url).json(body))
            .send()
            .await
            .map_err(|e| JobError::new(JobErrorKind::Transport(e.to_string())))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::METHOD_NOT_ALLOWED {
            return Ok(SubmitResponse::Missing);
        }
        let text = response
            .text()
            .await
            .map_err(|e| JobError::new(JobErrorKind::Transport(e.to_string())))?;
        if !status.is_success() {
            return Err(JobError::new(JobErrorKind::Rejected {
                status_code: status.as_u16(),
                message: text,
            }));
        }

        let parsed: Value = serde_json::from_str(&text)
            .map_err(|_| JobError::new(JobErrorKind::MissingJobId(text.clone())))?;
        let job_id = self
            .dialect
            .parse_job_id(&parsed)
            .ok_or_else(|| JobError::new(JobErrorKind::MissingJobId(text)))?;
        Ok(SubmitResponse::Accepted(JobHandle::new(job_id, url)))
    }

    /// Check a job's status once.
    ///
    /// Transport errors and non-auth HTTP errors surface as `Ok(Pending)`
    /// with a warning, so a flaky status endpoint only delays the job.
    pub async fn poll(&self, handle: &JobHandle) -> ReelsmithResult<JobStatus> {
        let url = self.url(&self.dialect.status_path(&handle.job_id));
        let response = match self.authorize(self.http.get(&url)).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(job_id = %handle.job_id, error = %e, "Status request failed");
                return Ok(JobStatus::Pending);
            }
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let message = response.text().await.unwrap_or_default();
            return Err(JobError::new(JobErrorKind::Rejected {
                status_code: status.as_u16(),
                message,
            })
            .into());
        }
        if !status.is_success() {
            warn!(job_id = %handle.job_id, status = status.as_u16(), "Status endpoint error");
            return Ok(JobStatus::Pending);
        }

        match response.json::<Value>().await {
            Ok(body) => Ok(self
                .dialect
                .interpret_status(&self.base_url, &handle.job_id, &body)),
            Err(e) => {
                warn!(job_id = %handle.job_id, error = %e, "Unreadable status response");
                Ok(JobStatus::Pending)
            }
        }
    }

    /// Poll until the job reaches a terminal state.
    ///
    /// Returns a timeout error once the configured max wait has elapsed with
    /// the job still pending, and a cancelled error as soon as `cancel`
    /// fires.
    #[instrument(skip(self, handle, cancel), fields(job_id = %handle.job_id, dialect = self.dialect.name()))]
    pub async fn await_output(
        &self,
        handle: &JobHandle,
        cancel: &CancellationToken,
    ) -> ReelsmithResult<JobOutput> {
        let started = Instant::now();
        let deadline = started + *self.config.max_wait();
        let cancelled = || JobError::new(JobErrorKind::Cancelled(handle.job_id.clone()));

        loop {
            let status = tokio::select! {
                _ = cancel.cancelled() => return Err(cancelled().into()),
                status = self.poll(handle) => status?,
            };

            match status {
                JobStatus::Completed(Some(output)) => {
                    info!(elapsed_ms = started.elapsed().as_millis() as u64, "Job completed");
                    return Ok(output);
                }
                JobStatus::Completed(None) => {
                    return Err(JobError::new(JobErrorKind::MissingOutput {
                        job_id: handle.job_id.clone(),
                        message: "no output file in completed job".to_string(),
                    })
                    .into());
                }
                JobStatus::Failed(message) => {
                    return Err(JobError::new(JobErrorKind::Failed {
                        job_id: handle.job_id.clone(),
                        message,
                    })
                    .into());
                }
                JobStatus::Pending => {}
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(waited_ms = started.elapsed().as_millis() as u64, "Job timed out");
                return Err(JobError::new(JobErrorKind::Timeout {
                    job_id: handle.job_id.clone(),
                    waited_secs: started.elapsed().as_secs(),
                })
                .into());
            }

            let pause = (*self.config.poll_interval()).min(deadline - now);
            tokio::select! {
                _ = cancel.cancelled() => return Err(cancelled().into()),
                _ = tokio::time::sleep(pause) => {}
            }
        }
    }

    /// Download a job's output.
    ///
    /// Credentials are only sent when the URL points at this provider.
    #[instrument(skip(self, output), fields(job_id = %output.job_id))]
    pub async fn download(&self, output: &JobOutput) -> ReelsmithResult<Vec<u8>> {
        let mut request = self.http.get(&output.download_url);
        if output.download_url.starts_with(&self.base_url) {
            request = self.authorize(request);
        }
        let response = request
            .send()
            .await
            .map_err(|e| JobError::new(JobErrorKind::Download(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(JobError::new(JobErrorKind::Download(format!(
                "HTTP {} from {}",
                status.as_u16(),
                output.download_url
            )))
            .into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| JobError::new(JobErrorKind::Download(e.to_string())))?;
        if bytes.is_empty() {
            return Err(JobError::new(JobErrorKind::Download(format!(
                "empty body from {}",
                output.download_url
            )))
            .into());
        }
        debug!(size = bytes.len(), "Downloaded job output");
        Ok(bytes.to_vec())
    }

    /// Submit, wait and download in one call.
    pub async fn run(
        &self,
        body: &Value,
        cancel: &CancellationToken,
    ) -> ReelsmithResult<(JobOutput, Vec<u8>)> {
        let handle = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(JobError::new(JobErrorKind::Cancelled("(unsubmitted)".to_string())).into())
            }
            handle = self.submit(body) => handle?,
        };
        let output = self.await_output(&handle, cancel).await?;
        let data = self.download(&output).await?;
        Ok((output, data))
    }
}
