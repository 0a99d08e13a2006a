//! The pipeline orchestrator.
//!
//! Drives text through narration, per-shot assets and final assembly. Every
//! stage reads the current version of its input and writes a new version of
//! its output, so any stage can be rerun without touching earlier results.
//!
//! ```text
//! chapter ─▶ narration ─▶ shots ─┬▶ image ─┐
//!                                ├▶ audio ─┼▶ video ─▶ final video
//!                                │    └▶ subtitle
//! ```

mod assets;
mod final_video;
mod lineage;
mod narration;
mod outcome;

pub use lineage::Lineage;

pub use narration::build_narration_batch;
pub use outcome::{
    AssetBatch, BatchFailure, BatchOutcome, ChapterStatus, KindSummary, StatusCounts,
    TriggerReceipt,
};

use reelsmith_config::PipelineConfig;
use reelsmith_core::{Chapter, Document, VersionKind};
use reelsmith_error::ReelsmithResult;
use reelsmith_interface::{MediaAssembler, PipelineRepository};
use reelsmith_models::ProviderSet;
use reelsmith_safety::{ContentFilter, TtsCleaner};
use reelsmith_storage::MediaStorage;
use reelsmith_text::SubtitleOptions;
use std::sync::Arc;

/// Tunables for the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    /// Generation tasks in flight per operation
    pub max_concurrency: usize,
    /// Speech speed multiplier
    pub speed_ratio: f32,
    /// Subtitle cue limits
    pub subtitle: SubtitleOptions,
    /// Clip length when a shot has neither audio nor a duration hint
    pub default_video_secs: u32,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl OrchestratorSettings {
    /// Settings from the `[pipeline]` section.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency.max(1),
            speed_ratio: config.speed_ratio,
            subtitle: SubtitleOptions::new(
                config.subtitle_max_chars,
                config.subtitle_strip_punctuation,
            ),
            default_video_secs: config.default_video_secs,
        }
    }
}

/// Coordinates providers, storage and the repository.
///
/// Cheap to clone; clones share every backend.
///
/// # Example
///
/// ```no_run
/// use reelsmith_pipeline::{FfmpegAssembler, InMemoryPipelineRepository, OrchestratorBuilder};
/// use reelsmith_config::ReelsmithConfig;
/// use reelsmith_models::ProviderSet;
/// use reelsmith_safety::{ContentFilter, TtsCleaner};
/// use reelsmith_storage::FileSystemStorage;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ReelsmithConfig::load()?;
/// let orchestrator = OrchestratorBuilder::default()
///     .providers(ProviderSet::from_config(&config)?)
///     .repository(Arc::new(InMemoryPipelineRepository::new()))
///     .storage(Arc::new(FileSystemStorage::new(&config.pipeline.storage_dir)?))
///     .assembler(Arc::new(FfmpegAssembler::new(&config.pipeline.ffmpeg_path)))
///     .content_filter(Arc::new(ContentFilter::new(config.safety.content_filter.clone())?))
///     .tts_cleaner(Arc::new(TtsCleaner::new(config.safety.tts_cleaner.clone())?))
///     .build()?;
///
/// let (_document, chapters) = orchestrator
///     .import_document("The Flood", "The river rose at dawn...", 3)
///     .await?;
/// orchestrator.generate_narration(chapters[0].id()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, derive_builder::Builder)]
#[builder(pattern = "owned")]
pub struct Orchestrator {
    providers: ProviderSet,
    repository: Arc<dyn PipelineRepository>,
    storage: Arc<dyn MediaStorage>,
    assembler: Arc<dyn MediaAssembler>,
    content_filter: Arc<ContentFilter>,
    tts_cleaner: Arc<TtsCleaner>,
    #[builder(default)]
    settings: OrchestratorSettings,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("providers", &self.providers)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Repository the orchestrator persists through.
    pub fn repository(&self) -> &Arc<dyn PipelineRepository> {
        &self.repository
    }

    /// Media storage backend.
    pub fn storage(&self) -> &Arc<dyn MediaStorage> {
        &self.storage
    }

    /// Active settings.
    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Version bookkeeping over the same repository.
    pub fn lineage(&self) -> Lineage {
        Lineage::new(self.repository.clone())
    }

    /// Split `text` into `chapter_count` chapters and persist them.
    ///
    /// # Errors
    ///
    /// Fails for empty text or a zero chapter count.
    pub async fn import_document(
        &self,
        title: &str,
        text: &str,
        chapter_count: usize,
    ) -> ReelsmithResult<(Document, Vec<Chapter>)> {
        self.lineage()
            .import_document(title, text, chapter_count)
            .await
    }

    /// See [`Lineage::resolve_version`].
    pub async fn resolve_version(
        &self,
        chapter_id: &str,
        kind: VersionKind,
    ) -> ReelsmithResult<Option<u32>> {
        self.lineage().resolve_version(chapter_id, kind).await
    }

    async fn require_version(&self, chapter_id: &str, kind: VersionKind) -> ReelsmithResult<u32> {
        self.lineage().require_version(chapter_id, kind).await
    }

    /// See [`Lineage::set_current_version`].
    pub async fn set_current_version(
        &self,
        chapter_id: &str,
        kind: VersionKind,
        version: u32,
    ) -> ReelsmithResult<()> {
        self.lineage()
            .set_current_version(chapter_id, kind, version)
            .await
    }

    /// See [`Lineage::chapter_status`].
    pub async fn chapter_status(&self, chapter_id: &str) -> ReelsmithResult<ChapterStatus> {
        self.lineage().chapter_status(chapter_id).await
    }

    /// Soft-delete a narration version with its scenes and shots.
    pub async fn delete_narration(&self, narration_id: &str) -> ReelsmithResult<()> {
        self.repository.delete_narration(narration_id).await
    }

    /// Soft-delete one artifact record. Stored media is kept.
    pub async fn delete_artifact(&self, artifact_id: &str) -> ReelsmithResult<()> {
        self.repository.delete_artifact(artifact_id).await
    }
}
