//! Content-addressed media on the local filesystem.

use crate::{MediaMetadata, MediaReference, MediaStorage};
use reelsmith_error::{ReelsmithResult, StorageError, StorageErrorKind};
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

const BACKEND: &str = "filesystem";

fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

fn create_dir_error(path: &Path, e: io::Error) -> StorageError {
    StorageError::new(StorageErrorKind::CreateDir {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn write_error(path: &Path, e: io::Error) -> StorageError {
    StorageError::new(StorageErrorKind::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Map a read-side IO error, keeping "file gone" distinct.
fn read_error(path: &Path, e: io::Error) -> StorageError {
    if e.kind() == io::ErrorKind::NotFound {
        StorageError::new(StorageErrorKind::Missing(path.display().to_string()))
    } else {
        StorageError::new(StorageErrorKind::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Media files keyed by SHA-256 under one root directory.
///
/// Layout is `{root}/{kind}/{hash[0:2]}/{hash[2:4]}/{hash}.{ext}`:
///
/// ```text
/// media/
/// ├── image/ab/cd/abcdef….png
/// ├── audio/12/34/123456….mp3
/// ├── subtitle/9f/00/9f00aa….srt
/// └── video/ef/01/ef0123….mp4
/// ```
///
/// Storing the same bytes twice reuses the existing file. New files are
/// written beside their final path and renamed into place, so ffmpeg and
/// other readers never see a partial clip.
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    root: PathBuf,
}

impl FileSystemStorage {
    /// Open (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[instrument(skip(root))]
    pub fn new(root: impl Into<PathBuf>) -> ReelsmithResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| create_dir_error(&root, e))?;
        info!(root = %root.display(), "Media storage ready");
        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, hash: &str, metadata: &MediaMetadata) -> PathBuf {
        self.root
            .join(metadata.media_type.to_string())
            .join(&hash[..2])
            .join(&hash[2..4])
            .join(format!("{}.{}", hash, metadata.extension()))
    }

    fn reference(
        &self,
        hash: String,
        path: &Path,
        size: usize,
        metadata: &MediaMetadata,
    ) -> MediaReference {
        MediaReference {
            id: uuid::Uuid::new_v4().to_string(),
            content_hash: hash,
            storage_backend: BACKEND.to_string(),
            storage_path: path.to_string_lossy().into_owned(),
            size_bytes: size as i64,
            media_type: metadata.media_type,
            mime_type: metadata.mime_type.clone(),
        }
    }
}

#[async_trait::async_trait]
impl MediaStorage for FileSystemStorage {
    #[instrument(skip(self, data, metadata), fields(size = data.len(), media_type = %metadata.media_type))]
    async fn store(
        &self,
        data: &[u8],
        metadata: &MediaMetadata,
    ) -> ReelsmithResult<MediaReference> {
        let hash = sha256_hex(data);
        let path = self.path_for(&hash, metadata);

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!(%hash, "Content already stored");
            return Ok(self.reference(hash, &path, data.len(), metadata));
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| create_dir_error(parent, e))?;
        }

        // Unique per writer; two tasks storing the same clip must not share it.
        let staging = path.with_extension(format!("{}.part", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&staging, data)
            .await
            .map_err(|e| write_error(&staging, e))?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|e| write_error(&path, e))?;

        info!(
            %hash,
            path = %path.display(),
            duration_secs = ?metadata.duration_seconds,
            "Stored media"
        );
        Ok(self.reference(hash, &path, data.len(), metadata))
    }

    #[instrument(skip(self, reference), fields(path = %reference.storage_path))]
    async fn retrieve(&self, reference: &MediaReference) -> ReelsmithResult<Vec<u8>> {
        let path = Path::new(&reference.storage_path);
        let data = tokio::fs::read(path).await.map_err(|e| read_error(path, e))?;

        let found = sha256_hex(&data);
        if found != reference.content_hash {
            return Err(StorageError::new(StorageErrorKind::HashMismatch {
                expected: reference.content_hash.clone(),
                found,
            })
            .into());
        }
        debug!(size = data.len(), "Read media");
        Ok(data)
    }

    fn local_path(&self, reference: &MediaReference) -> Option<PathBuf> {
        (reference.storage_backend == BACKEND).then(|| PathBuf::from(&reference.storage_path))
    }

    #[instrument(skip(self, reference), fields(path = %reference.storage_path))]
    async fn delete(&self, reference: &MediaReference) -> ReelsmithResult<()> {
        let path = Path::new(&reference.storage_path);
        tokio::fs::remove_file(path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::Missing(reference.storage_path.clone()))
            } else {
                write_error(path, e)
            }
        })?;
        info!("Deleted media");
        Ok(())
    }

    async fn exists(&self, reference: &MediaReference) -> ReelsmithResult<bool> {
        Ok(tokio::fs::try_exists(&reference.storage_path)
            .await
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_is_lowercase_hex() {
        let hash = sha256_hex(b"reel");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
