//! Reelsmith - narrated short videos from long-form text
//!
//! Reelsmith splits a document into chapters, asks a text model for a
//! scene-and-shot narration script, then generates one image, one narration
//! track, one subtitle file and one clip per shot before concatenating the
//! clips into a final chapter video. Every stage writes a new version, so
//! any stage can be rerun or rolled back without touching the others.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use reelsmith::{CancellationToken, ReelsmithConfig, build_orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ReelsmithConfig::load()?;
//!     let orchestrator = build_orchestrator(&config).await?;
//!
//!     let (_doc, chapters) = orchestrator
//!         .import_document("The Flood", &std::fs::read_to_string("flood.txt")?, 4)
//!         .await?;
//!     let chapter = chapters[0].id();
//!     let cancel = CancellationToken::new();
//!
//!     orchestrator.generate_narration(chapter).await?;
//!     orchestrator.generate_images(chapter, &cancel).await?;
//!     orchestrator.generate_audio(chapter, &cancel).await?;
//!     orchestrator.generate_videos(chapter, &cancel).await?;
//!     orchestrator.generate_final_video_for_chapter(chapter).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `reelsmith-error` - Error types
//! - `reelsmith-core` - Records, versions and script types
//! - `reelsmith-config` - Layered TOML configuration
//! - `reelsmith-text` - Chapter splitting and subtitle alignment
//! - `reelsmith-safety` - Content filter and TTS cleaner
//! - `reelsmith-storage` - Content-addressable media storage
//! - `reelsmith-interface` - Provider and repository traits
//! - `reelsmith-jobs` - Submit-and-poll client for job-based backends
//! - `reelsmith-models` - Provider backends
//! - `reelsmith-pipeline` - Orchestrator, repository and assembler
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use reelsmith_config::*;
pub use reelsmith_core::*;
pub use reelsmith_error::*;
pub use reelsmith_interface::*;
pub use reelsmith_jobs::{JobClient, JobClientConfig, JobDialect, JobHandle, JobOutput, JobStatus};
pub use reelsmith_models::{ProviderSet, data_url};
pub use reelsmith_pipeline::*;
pub use reelsmith_safety::*;
pub use reelsmith_storage::{FileSystemStorage, MediaMetadata, MediaStorage};
pub use reelsmith_text::*;

use std::sync::Arc;
use tracing::{debug, instrument};

/// Open the repository named by `[pipeline]`.
///
/// With a `snapshot_path` the repository is loaded from, and written back
/// to, that file. Without one it lives only for this process.
///
/// # Errors
///
/// Fails when the snapshot exists but cannot be read.
#[instrument(skip(config))]
pub async fn open_repository(
    config: &ReelsmithConfig,
) -> ReelsmithResult<InMemoryPipelineRepository> {
    match &config.pipeline.snapshot_path {
        Some(path) => InMemoryPipelineRepository::open(path).await,
        None => {
            debug!("No snapshot path configured; records are not persisted");
            Ok(InMemoryPipelineRepository::new())
        }
    }
}

/// Version bookkeeping without any provider.
///
/// Used by commands that only read or re-point versions, so they work
/// without API credentials.
pub async fn open_lineage(config: &ReelsmithConfig) -> ReelsmithResult<Lineage> {
    let repository = open_repository(config).await?;
    Ok(Lineage::new(Arc::new(repository)))
}

/// Build a fully wired orchestrator from configuration.
///
/// # Errors
///
/// Fails when a provider is misconfigured (for example a missing API key),
/// the storage directory cannot be created, or the snapshot is unreadable.
#[instrument(skip(config))]
pub async fn build_orchestrator(config: &ReelsmithConfig) -> ReelsmithResult<Orchestrator> {
    let providers = ProviderSet::from_config(config)?;
    let repository = open_repository(config).await?;
    let storage = FileSystemStorage::new(&config.pipeline.storage_dir)?;
    let content_filter = ContentFilter::new(config.safety.content_filter.clone())?;
    let tts_cleaner = TtsCleaner::new(config.safety.tts_cleaner.clone())?;

    OrchestratorBuilder::default()
        .providers(providers)
        .repository(Arc::new(repository))
        .storage(Arc::new(storage))
        .assembler(Arc::new(FfmpegAssembler::new(&config.pipeline.ffmpeg_path)))
        .content_filter(Arc::new(content_filter))
        .tts_cleaner(Arc::new(tts_cleaner))
        .settings(OrchestratorSettings::from_config(&config.pipeline))
        .build()
        .map_err(|e| ConfigError::new(format!("Failed to build orchestrator: {}", e)).into())
}
