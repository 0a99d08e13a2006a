//! Content-addressable media storage for Reelsmith.
//!
//! Generated images, audio, subtitles and videos are stored by SHA-256 hash;
//! artifact records only keep the returned [`MediaReference`].
//!
//! # Example
//!
//! ```rust
//! use reelsmith_storage::{FileSystemStorage, MediaStorage, MediaMetadata, MediaType};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = FileSystemStorage::new("/tmp/reelsmith-media")?;
//! let metadata = MediaMetadata::new(MediaType::Image, "image/png");
//!
//! let data = vec![0u8; 1024];
//! let reference = storage.store(&data, &metadata).await?;
//! assert_eq!(storage.retrieve(&reference).await?, data);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod metadata;
mod storage;

pub use filesystem::FileSystemStorage;
pub use metadata::MediaMetadata;
pub use reelsmith_core::{MediaReference, MediaType};
pub use reelsmith_error::{StorageError, StorageErrorKind};
pub use storage::MediaStorage;
