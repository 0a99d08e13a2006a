//! Final video assembly contract.

use async_trait::async_trait;
use reelsmith_error::ReelsmithResult;
use std::path::PathBuf;

/// One clip of a final video.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipInput {
    /// Per-shot video file
    pub video: PathBuf,
    /// Narration audio laid over the clip, if any
    pub audio: Option<PathBuf>,
}

/// Joins per-shot clips into one video using an external media tool.
#[async_trait]
pub trait MediaAssembler: Send + Sync {
    /// Concatenate `clips` in order and return the encoded video.
    async fn assemble(&self, clips: &[ClipInput]) -> ReelsmithResult<Vec<u8>>;
}
