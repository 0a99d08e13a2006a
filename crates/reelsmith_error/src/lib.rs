//! Error types for the Reelsmith pipeline.
//!
//! This crate provides the error types shared by every Reelsmith crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use reelsmith_error::{PipelineError, PipelineErrorKind, ReelsmithResult};
//!
//! fn require_scenes(count: usize) -> ReelsmithResult<usize> {
//!     if count == 0 {
//!         Err(PipelineError::new(PipelineErrorKind::Validation(
//!             "narration script has no scenes".into(),
//!         )))?
//!     }
//!     Ok(count)
//! }
//!
//! let err = require_scenes(0).unwrap_err();
//! assert!(err.to_string().contains("no scenes"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod job;
mod json;
mod media;
mod pipeline;
mod provider;
mod repository;
mod storage;

pub use config::ConfigError;
pub use error::{ReelsmithError, ReelsmithErrorKind, ReelsmithResult};
pub use job::{JobError, JobErrorKind};
pub use json::JsonError;
pub use media::{MediaError, MediaErrorKind};
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use provider::{ProviderError, ProviderErrorKind, RetryableError};
pub use repository::{RepositoryError, RepositoryErrorKind};
pub use storage::{StorageError, StorageErrorKind};
