//! Repository error types.

/// Kinds of repository failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum RepositoryErrorKind {
    /// Record does not exist or was soft-deleted
    #[display("Record not found: {}", _0)]
    NotFound(String),
    /// Status transition did not match the expected current status
    #[display("Status conflict on {}: expected {}, found {}", id, expected, found)]
    StatusConflict {
        /// Record id
        id: String,
        /// Status the caller expected
        expected: String,
        /// Status actually stored
        found: String,
    },
    /// Batch write was malformed
    #[display("Invalid batch: {}", _0)]
    InvalidBatch(String),
    /// Snapshot file could not be read or written
    #[display("Persistence failure: {}", _0)]
    Persistence(String),
}

/// Repository error with location tracking.
///
/// # Examples
///
/// ```
/// use reelsmith_error::{RepositoryError, RepositoryErrorKind};
///
/// let err = RepositoryError::new(RepositoryErrorKind::NotFound("shot 42".into()));
/// assert!(format!("{}", err).contains("shot 42"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Repository Error: {} at line {} in {}", kind, line, file)]
pub struct RepositoryError {
    /// The kind of error that occurred
    pub kind: RepositoryErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RepositoryError {
    /// Create a new repository error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RepositoryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
