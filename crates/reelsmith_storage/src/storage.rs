//! The media storage seam used by the orchestrator.

use crate::{MediaMetadata, MediaReference};
use reelsmith_error::ReelsmithResult;
use std::path::PathBuf;

/// Backend that holds generated media bytes.
#[async_trait::async_trait]
pub trait MediaStorage: Send + Sync {
    /// Persist a payload and describe where it landed.
    ///
    /// Identical content yields the same content hash and storage path.
    async fn store(&self, data: &[u8], metadata: &MediaMetadata)
    -> ReelsmithResult<MediaReference>;

    /// Retrieve media by reference, verifying its hash.
    async fn retrieve(&self, reference: &MediaReference) -> ReelsmithResult<Vec<u8>>;

    /// Local filesystem path of the media, when the backend has one.
    ///
    /// External tools such as ffmpeg read clips through this path.
    fn local_path(&self, reference: &MediaReference) -> Option<PathBuf>;

    /// Remove the referenced payload.
    async fn delete(&self, reference: &MediaReference) -> ReelsmithResult<()>;

    /// Whether the referenced payload is still present.
    async fn exists(&self, reference: &MediaReference) -> ReelsmithResult<bool>;
}
