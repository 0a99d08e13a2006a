//! Top-level error wrapper types.

use crate::{
    ConfigError, JobError, JsonError, MediaError, PipelineError, ProviderError, RepositoryError,
    StorageError,
};

/// Every error a Reelsmith crate can surface.
///
/// # Examples
///
/// ```
/// use reelsmith_error::{ReelsmithError, ReelsmithErrorKind, JsonError};
///
/// let err: ReelsmithError = JsonError::new("trailing comma").into();
/// assert!(matches!(err.kind(), ReelsmithErrorKind::Json(_)));
/// assert!(format!("{}", err).contains("JSON Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ReelsmithErrorKind {
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Provider adapter error
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Async job error
    #[from(JobError)]
    Job(JobError),
    /// Orchestrator error
    #[from(PipelineError)]
    Pipeline(PipelineError),
    /// Repository error
    #[from(RepositoryError)]
    Repository(RepositoryError),
    /// Media assembly error
    #[from(MediaError)]
    Media(MediaError),
}

/// Reelsmith error with kind discrimination.
///
/// # Examples
///
/// ```
/// use reelsmith_error::{ReelsmithError, ReelsmithResult, ConfigError};
///
/// fn might_fail() -> ReelsmithResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Reelsmith Error: {}", _0)]
pub struct ReelsmithError(Box<ReelsmithErrorKind>);

impl ReelsmithError {
    /// Create a new error from a kind.
    pub fn new(kind: ReelsmithErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ReelsmithErrorKind {
        &self.0
    }

    /// True when the underlying failure is a job wait deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind(), ReelsmithErrorKind::Job(e) if e.kind.is_timeout())
    }

    /// True when the underlying failure is a caller cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self.kind() {
            ReelsmithErrorKind::Job(e) => matches!(e.kind, crate::JobErrorKind::Cancelled(_)),
            ReelsmithErrorKind::Pipeline(e) => {
                matches!(e.kind, crate::PipelineErrorKind::Cancelled)
            }
            _ => false,
        }
    }
}

// Generic From implementation for any type that converts to ReelsmithErrorKind
impl<T> From<T> for ReelsmithError
where
    T: Into<ReelsmithErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Reelsmith operations.
pub type ReelsmithResult<T> = std::result::Result<T, ReelsmithError>;
