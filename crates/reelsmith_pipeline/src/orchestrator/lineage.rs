//! Version lineage: documents, version resolution and current pointers.
//!
//! Nothing here touches a provider, so bookkeeping commands work without
//! any API credentials.

use super::{ChapterStatus, KindSummary, StatusCounts};
use chrono::Utc;
use reelsmith_core::{Chapter, CurrentVersion, Document, RecordStatus, VersionKind};
use reelsmith_error::{PipelineError, PipelineErrorKind, ReelsmithResult};
use reelsmith_interface::{ArtifactFilter, PipelineRepository};
use reelsmith_text::split_chapters;
use std::sync::Arc;
use tracing::{info, instrument};

/// Artifact version sequences in pipeline order.
const ARTIFACT_KINDS: [VersionKind; 5] = [
    VersionKind::Image,
    VersionKind::Audio,
    VersionKind::Subtitle,
    VersionKind::Video,
    VersionKind::FinalVideo,
];

/// Version bookkeeping over a [`PipelineRepository`].
#[derive(Clone)]
pub struct Lineage {
    repository: Arc<dyn PipelineRepository>,
}

impl std::fmt::Debug for Lineage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lineage").finish_non_exhaustive()
    }
}

impl Lineage {
    /// Wrap a repository.
    pub fn new(repository: Arc<dyn PipelineRepository>) -> Self {
        Self { repository }
    }

    /// Split `text` into `chapter_count` chapters and persist them.
    ///
    /// # Errors
    ///
    /// Fails for empty text or a zero chapter count.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn import_document(
        &self,
        title: &str,
        text: &str,
        chapter_count: usize,
    ) -> ReelsmithResult<(Document, Vec<Chapter>)> {
        let parts = split_chapters(text, chapter_count)?;
        let document = Document::new(title, text);
        let chapters: Vec<Chapter> = parts
            .into_iter()
            .enumerate()
            .map(|(i, part)| Chapter::new(&document.id, i as u32 + 1, part))
            .collect();
        self.repository
            .insert_document(&document, &chapters)
            .await?;
        info!(document_id = %document.id, chapters = chapters.len(), "Imported document");
        Ok((document, chapters))
    }

    /// Version downstream stages should use for `kind`.
    ///
    /// The current-version pointer wins while the version it names still
    /// exists. Otherwise the latest version with at least one completed
    /// record is used. `None` when neither exists.
    pub async fn resolve_version(
        &self,
        chapter_id: &str,
        kind: VersionKind,
    ) -> ReelsmithResult<Option<u32>> {
        if let Some(pointer) = self.repository.current_version(chapter_id, kind).await?
            && self.version_exists(chapter_id, kind, pointer.version).await?
        {
            return Ok(Some(pointer.version));
        }

        if kind == VersionKind::Narration {
            let narrations = self.repository.list_narrations(chapter_id).await?;
            return Ok(narrations
                .iter()
                .filter(|n| n.status == RecordStatus::Completed)
                .map(|n| n.version)
                .max());
        }

        let completed = self
            .repository
            .list_artifacts(
                &ArtifactFilter::for_chapter(chapter_id, kind).status(RecordStatus::Completed),
            )
            .await?;
        Ok(completed.iter().map(|a| a.version).max())
    }

    async fn version_exists(
        &self,
        chapter_id: &str,
        kind: VersionKind,
        version: u32,
    ) -> ReelsmithResult<bool> {
        if kind == VersionKind::Narration {
            let narrations = self.repository.list_narrations(chapter_id).await?;
            return Ok(narrations.iter().any(|n| n.version == version));
        }
        let records = self
            .repository
            .list_artifacts(&ArtifactFilter::for_chapter(chapter_id, kind).version(version))
            .await?;
        Ok(!records.is_empty())
    }

    /// Like [`resolve_version`](Self::resolve_version), but a missing
    /// version is a `NoVersion` error.
    pub async fn require_version(
        &self,
        chapter_id: &str,
        kind: VersionKind,
    ) -> ReelsmithResult<u32> {
        self.resolve_version(chapter_id, kind).await?.ok_or_else(|| {
            PipelineError::new(PipelineErrorKind::NoVersion {
                kind: kind.to_string(),
                chapter_id: chapter_id.to_string(),
            })
            .into()
        })
    }

    /// Select `version` as current for `kind`. Records are never touched.
    ///
    /// # Errors
    ///
    /// Fails if the chapter or the version does not exist.
    #[instrument(skip(self))]
    pub async fn set_current_version(
        &self,
        chapter_id: &str,
        kind: VersionKind,
        version: u32,
    ) -> ReelsmithResult<()> {
        self.repository.get_chapter(chapter_id).await?;
        if !self.version_exists(chapter_id, kind, version).await? {
            return Err(PipelineError::new(PipelineErrorKind::NotFound {
                entity: format!("{} version", kind),
                id: version.to_string(),
            })
            .into());
        }
        self.repository
            .set_current_version(CurrentVersion {
                chapter_id: chapter_id.to_string(),
                kind,
                version,
                updated_at: Utc::now(),
            })
            .await?;
        info!("Current version updated");
        Ok(())
    }

    /// Summarize versions and record status for a chapter.
    #[instrument(skip(self))]
    pub async fn chapter_status(&self, chapter_id: &str) -> ReelsmithResult<ChapterStatus> {
        self.repository.get_chapter(chapter_id).await?;
        let narration_versions: Vec<u32> = self
            .repository
            .list_narrations(chapter_id)
            .await?
            .iter()
            .map(|n| n.version)
            .collect();
        let current_narration = self
            .resolve_version(chapter_id, VersionKind::Narration)
            .await?;

        let mut kinds = Vec::with_capacity(ARTIFACT_KINDS.len());
        for kind in ARTIFACT_KINDS {
            let records = self
                .repository
                .list_artifacts(&ArtifactFilter::for_chapter(chapter_id, kind))
                .await?;
            let latest = records.iter().map(|a| a.version).max();
            let current = self.resolve_version(chapter_id, kind).await?;
            let mut counts = StatusCounts::default();
            if let Some(shown) = current.or(latest) {
                records
                    .iter()
                    .filter(|a| a.version == shown)
                    .for_each(|a| counts.add(a.status));
            }
            kinds.push(KindSummary {
                kind,
                current,
                latest,
                counts,
            });
        }

        Ok(ChapterStatus {
            chapter_id: chapter_id.to_string(),
            narration_versions,
            current_narration,
            kinds,
        })
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
