//! Media assembly error types.

/// Failures while muxing or concatenating clips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum MediaErrorKind {
    /// The media tool could not be started
    #[display("Failed to launch {}: {}", tool, message)]
    Launch {
        /// Tool name or path
        tool: String,
        /// OS error
        message: String,
    },
    /// The media tool exited unsuccessfully
    #[display("{} exited with status {}: {}", tool, status, stderr)]
    ToolFailed {
        /// Tool name or path
        tool: String,
        /// Exit status
        status: String,
        /// Captured stderr tail
        stderr: String,
    },
    /// Nothing to assemble
    #[display("No clips to assemble")]
    NoClips,
    /// Scratch file handling failed
    #[display("Scratch file error: {}", _0)]
    Io(String),
}

/// Media error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Media Error: {} at line {} in {}", kind, line, file)]
pub struct MediaError {
    /// The kind of error that occurred
    pub kind: MediaErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl MediaError {
    /// Create a new media error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: MediaErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
