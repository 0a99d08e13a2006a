//! Provider adapter errors and retry classification.

/// Failure conditions reported by a generation provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ProviderErrorKind {
    /// API key environment variable is not set
    #[display("API key environment variable '{}' not set", _0)]
    MissingApiKey(String),
    /// Request never produced an HTTP response
    #[display("Transport failure: {}", _0)]
    Transport(String),
    /// Provider answered with a non-success status
    #[display("HTTP {} error: {}", status_code, message)]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Response body or reason
        message: String,
    },
    /// Provider envelope carried a failure code
    #[display("Provider returned code {}: {}", code, message)]
    Envelope {
        /// Provider-specific result code
        code: i64,
        /// Provider-supplied message
        message: String,
    },
    /// Response body did not have the expected shape
    #[display("Unexpected response: {}", _0)]
    InvalidResponse(String),
    /// Response parsed but carried no usable payload
    #[display("Provider returned no content: {}", _0)]
    EmptyResponse(String),
    /// Base64 decoding failed
    #[display("Base64 decode error: {}", _0)]
    Base64Decode(String),
    /// Request violates a provider constraint before being sent
    #[display("Invalid request: {}", _0)]
    InvalidRequest(String),
    /// Backend name in configuration is unknown
    #[display("Unknown provider backend '{}'", _0)]
    UnknownBackend(String),
}

impl ProviderErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderErrorKind::Transport(_) => true,
            ProviderErrorKind::Api { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500..=599)
            }
            _ => false,
        }
    }
}

/// Provider error with source location tracking.
///
/// # Examples
///
/// ```
/// use reelsmith_error::{ProviderError, ProviderErrorKind};
///
/// let err = ProviderError::new(ProviderErrorKind::MissingApiKey("ARK_API_KEY".into()));
/// assert!(format!("{}", err).contains("ARK_API_KEY"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error: {} at line {} in {}", kind, line, file)]
pub struct ProviderError {
    /// The kind of error that occurred
    pub kind: ProviderErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new ProviderError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ProviderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Trait for errors that support retry logic.
///
/// Transient errors like 503 (service unavailable) or a dropped connection
/// return true. Rejections such as 400 or 401 return false.
///
/// # Examples
///
/// ```
/// use reelsmith_error::{ProviderError, ProviderErrorKind, RetryableError};
///
/// let err = ProviderError::new(ProviderErrorKind::Api {
///     status_code: 503,
///     message: "Service unavailable".to_string(),
/// });
/// assert!(err.is_retryable());
///
/// let err = ProviderError::new(ProviderErrorKind::Api {
///     status_code: 400,
///     message: "bad workflow".to_string(),
/// });
/// assert!(!err.is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for ProviderError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
