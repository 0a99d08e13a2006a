//! Media storage errors.

/// What went wrong while reading or writing stored media.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StorageErrorKind {
    /// A directory under the storage root could not be created
    #[display("Cannot create {}: {}", path, message)]
    CreateDir {
        /// Directory path
        path: String,
        /// OS error text
        message: String,
    },
    /// Writing, renaming or removing a media file failed
    #[display("Cannot write {}: {}", path, message)]
    Write {
        /// File path
        path: String,
        /// OS error text
        message: String,
    },
    /// Reading a media file failed
    #[display("Cannot read {}: {}", path, message)]
    Read {
        /// File path
        path: String,
        /// OS error text
        message: String,
    },
    /// The referenced file is gone
    #[display("Media missing at {}", _0)]
    Missing(String),
    /// Stored bytes no longer match the content hash
    #[display("Content hash mismatch: expected {}, found {}", expected, found)]
    HashMismatch {
        /// Hash recorded in the reference
        expected: String,
        /// Hash of the bytes on disk
        found: String,
    },
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use reelsmith_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::Missing("media/video/ab/cd/abcd.mp4".into()));
/// assert!(format!("{}", err).contains("Media missing"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The specific error condition
    pub kind: StorageErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with caller location.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
