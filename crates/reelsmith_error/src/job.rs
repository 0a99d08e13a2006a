//! Async job client error types.

/// Failure conditions of a submit/poll/download job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum JobErrorKind {
    /// Request never produced an HTTP response
    #[display("Transport failure: {}", _0)]
    Transport(String),
    /// Primary and fallback submit endpoints both answered 404/405
    #[display("Submit endpoints not found: {} and {}", primary, fallback)]
    EndpointNotFound {
        /// Primary endpoint URL
        primary: String,
        /// Fallback endpoint URL
        fallback: String,
    },
    /// Provider rejected or failed the submission
    #[display("Submit rejected with HTTP {}: {}", status_code, message)]
    Rejected {
        /// HTTP status code
        status_code: u16,
        /// Response body
        message: String,
    },
    /// Submission accepted but no job id was returned
    #[display("Submit response carried no job id: {}", _0)]
    MissingJobId(String),
    /// Job did not reach a terminal state before the deadline
    #[display("Job {} timed out after {}s", job_id, waited_secs)]
    Timeout {
        /// Provider job id
        job_id: String,
        /// Seconds spent waiting
        waited_secs: u64,
    },
    /// Provider reported a terminal failure
    #[display("Job {} failed: {}", job_id, message)]
    Failed {
        /// Provider job id
        job_id: String,
        /// Provider-supplied reason
        message: String,
    },
    /// Job finished but no output artifact could be located
    #[display("Job {} finished without output: {}", job_id, message)]
    MissingOutput {
        /// Provider job id
        job_id: String,
        /// What was missing
        message: String,
    },
    /// Downloading the output failed
    #[display("Download failed: {}", _0)]
    Download(String),
    /// Waiting was cancelled by the caller
    #[display("Job {} cancelled", _0)]
    Cancelled(String),
}

impl JobErrorKind {
    /// Whether a submit attempt that failed this way should be attempted again.
    pub fn is_retryable(&self) -> bool {
        match self {
            JobErrorKind::Transport(_) | JobErrorKind::EndpointNotFound { .. } => true,
            JobErrorKind::Rejected { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }

    /// Whether this failure came from exceeding the wait deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, JobErrorKind::Timeout { .. })
    }
}

/// Job error with source location tracking.
///
/// # Examples
///
/// ```
/// use reelsmith_error::{JobError, JobErrorKind};
///
/// let err = JobError::new(JobErrorKind::Timeout { job_id: "abc".into(), waited_secs: 300 });
/// assert!(err.kind.is_timeout());
/// assert!(format!("{}", err).contains("timed out"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Job Error: {} at line {} in {}", kind, line, file)]
pub struct JobError {
    /// The kind of error that occurred
    pub kind: JobErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl JobError {
    /// Create a new JobError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: JobErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl crate::RetryableError for JobError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
