//! Pipeline orchestration error types.

/// Specific error conditions for orchestrator operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// Generated script or request failed validation
    #[display("Validation failed: {}", _0)]
    Validation(String),
    /// Referenced entity does not exist
    #[display("{} not found: {}", entity, id)]
    NotFound {
        /// Entity type
        entity: String,
        /// Entity id
        id: String,
    },
    /// No version of a kind is available for a chapter
    #[display("No {} version available for chapter {}", kind, chapter_id)]
    NoVersion {
        /// Version kind
        kind: String,
        /// Chapter id
        chapter_id: String,
    },
    /// A prerequisite artifact is not completed yet
    #[display("Missing prerequisite: {}", _0)]
    MissingPrerequisite(String),
    /// One or more shots lack a completed video
    #[display("Missing narration videos for shots: {}", _0)]
    MissingNarrationVideos(String),
    /// Chapter splitting was asked for zero chapters or empty text
    #[display("Cannot split document: {}", _0)]
    InvalidSplit(String),
    /// Operation was cancelled
    #[display("Operation cancelled")]
    Cancelled,
}

/// Error type for pipeline operations.
///
/// # Examples
///
/// ```
/// use reelsmith_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::Validation("scenes missing".into()));
/// assert!(format!("{}", err).contains("scenes missing"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The specific error condition
    pub kind: PipelineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
