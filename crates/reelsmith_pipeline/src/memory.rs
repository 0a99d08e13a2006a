//! In-memory implementation of [`PipelineRepository`].
//!
//! All records live in one map set behind a single `RwLock`, so batch inserts
//! and version assignment are atomic with respect to each other. When opened
//! with a snapshot path, every write is applied to a copy of the state and
//! flushed to a JSON file (written to a temporary sibling and renamed into
//! place) before the copy replaces the live state. A failed flush leaves the
//! repository exactly as it was.

use async_trait::async_trait;
use chrono::Utc;
use reelsmith_core::{
    Artifact, ArtifactDetails, Chapter, CurrentVersion, Document, MediaReference, Narration,
    RecordStatus, Scene, Shot, VersionKind,
};
use reelsmith_error::{
    JsonError, ReelsmithError, ReelsmithResult, RepositoryError, RepositoryErrorKind,
};
use reelsmith_interface::{ArtifactFilter, NarrationBatch, PipelineRepository};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Failure message stored when a caller fails a record without a reason.
const GENERIC_FAILURE: &str = "generation failed";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RepositoryState {
    documents: HashMap<String, Document>,
    chapters: HashMap<String, Chapter>,
    narrations: HashMap<String, Narration>,
    scenes: HashMap<String, Scene>,
    shots: HashMap<String, Shot>,
    artifacts: HashMap<String, Artifact>,
    pointers: Vec<CurrentVersion>,
}

impl RepositoryState {
    /// Next narration version for a chapter. Deleted rows still count so
    /// numbers are never reused.
    fn next_narration_version(&self, chapter_id: &str) -> u32 {
        self.narrations
            .values()
            .filter(|n| n.chapter_id == chapter_id)
            .map(|n| n.version)
            .max()
            .unwrap_or(0)
            + 1
    }

    fn next_artifact_version(&self, chapter_id: &str, kind: VersionKind) -> u32 {
        self.artifacts
            .values()
            .filter(|a| a.chapter_id == chapter_id && a.version_kind() == kind)
            .map(|a| a.version)
            .max()
            .unwrap_or(0)
            + 1
    }

    fn live_artifact_mut(&mut self, id: &str) -> ReelsmithResult<&mut Artifact> {
        self.artifacts
            .get_mut(id)
            .filter(|a| a.deleted_at.is_none())
            .ok_or_else(|| not_found("artifact", id))
    }
}

/// Live artifact that has not reached a terminal status.
fn open_artifact_mut<'a>(
    state: &'a mut RepositoryState,
    id: &str,
) -> ReelsmithResult<&'a mut Artifact> {
    let artifact = state.live_artifact_mut(id)?;
    if artifact.status.is_terminal() {
        return Err(RepositoryError::new(RepositoryErrorKind::StatusConflict {
            id: id.to_string(),
            expected: "pending or processing".to_string(),
            found: artifact.status.to_string(),
        })
        .into());
    }
    Ok(artifact)
}

fn not_found(entity: &str, id: &str) -> ReelsmithError {
    RepositoryError::new(RepositoryErrorKind::NotFound(format!("{} {}", entity, id))).into()
}

fn invalid_batch(message: impl Into<String>) -> ReelsmithError {
    RepositoryError::new(RepositoryErrorKind::InvalidBatch(message.into())).into()
}

fn persistence(message: impl Into<String>) -> ReelsmithError {
    RepositoryError::new(RepositoryErrorKind::Persistence(message.into())).into()
}

/// In-memory pipeline repository with optional JSON snapshot persistence.
///
/// Clones share the same underlying state.
///
/// # Example
///
/// ```
/// use reelsmith_pipeline::InMemoryPipelineRepository;
///
/// # async fn example() {
/// let repo = InMemoryPipelineRepository::new();
/// assert!(repo.is_empty().await);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryPipelineRepository {
    state: Arc<RwLock<RepositoryState>>,
    snapshot_path: Option<PathBuf>,
}

impl InMemoryPipelineRepository {
    /// Create a new empty repository that is never written to disk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a repository backed by a snapshot file.
    ///
    /// A missing file starts an empty repository; the file is created on the
    /// first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> ReelsmithResult<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str::<RepositoryState>(&contents).map_err(|e| {
                JsonError::new(format!(
                    "Failed to parse snapshot {}: {}",
                    path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No snapshot yet, starting empty");
                RepositoryState::default()
            }
            Err(e) => {
                return Err(persistence(format!(
                    "Failed to read snapshot {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        debug!(
            documents = state.documents.len(),
            narrations = state.narrations.len(),
            artifacts = state.artifacts.len(),
            "Loaded snapshot"
        );
        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            snapshot_path: Some(path),
        })
    }

    /// Snapshot file, if the repository persists.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Number of stored artifacts, including soft-deleted ones.
    pub async fn len(&self) -> usize {
        self.state.read().await.artifacts.len()
    }

    /// True when no document has been imported.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.documents.is_empty()
    }

    /// Apply a change under the caller's write lock.
    ///
    /// Snapshot-backed repositories change a copy, flush it, then swap it in;
    /// `apply` must not mutate before its own checks pass.
    async fn commit<T, F>(&self, state: &mut RepositoryState, apply: F) -> ReelsmithResult<T>
    where
        F: FnOnce(&mut RepositoryState) -> ReelsmithResult<T> + Send,
        T: Send,
    {
        if self.snapshot_path.is_none() {
            return apply(state);
        }
        let mut draft = state.clone();
        let value = apply(&mut draft)?;
        self.persist(&draft).await?;
        *state = draft;
        Ok(value)
    }

    /// Write the snapshot while the caller still holds the write lock.
    async fn persist(&self, state: &RepositoryState) -> ReelsmithResult<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        let contents = serde_json::to_vec_pretty(state)
            .map_err(|e| JsonError::new(format!("Failed to serialize snapshot: {}", e)))?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| persistence(format!("Failed to create snapshot dir: {}", e)))?;
        }
        let temp = path.with_extension("json.tmp");
        tokio::fs::write(&temp, contents)
            .await
            .map_err(|e| persistence(format!("Failed to write snapshot: {}", e)))?;
        tokio::fs::rename(&temp, path)
            .await
            .map_err(|e| persistence(format!("Failed to replace snapshot: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl PipelineRepository for InMemoryPipelineRepository {
    #[instrument(skip(self, document, chapters), fields(document_id = %document.id, chapters = chapters.len()))]
    async fn insert_document(
        &self,
        document: &Document,
        chapters: &[Chapter],
    ) -> ReelsmithResult<()> {
        if let Some(stray) = chapters.iter().find(|c| c.document_id() != &document.id) {
            return Err(invalid_batch(format!(
                "chapter {} belongs to document {}",
                stray.id(),
                stray.document_id()
            )));
        }
        let mut state = self.state.write().await;
        if state.documents.contains_key(&document.id) {
            return Err(invalid_batch(format!("document {} already exists", document.id)));
        }
        self.commit(&mut state, |state| {
            state.documents.insert(document.id.clone(), document.clone());
            for chapter in chapters {
                state.chapters.insert(chapter.id().clone(), chapter.clone());
            }
            Ok(())
        })
        .await
    }

    async fn get_document(&self, id: &str) -> ReelsmithResult<Document> {
        let state = self.state.read().await;
        state
            .documents
            .get(id)
            .filter(|d| d.deleted_at.is_none())
            .cloned()
            .ok_or_else(|| not_found("document", id))
    }

    async fn get_chapter(&self, id: &str) -> ReelsmithResult<Chapter> {
        let state = self.state.read().await;
        state
            .chapters
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("chapter", id))
    }

    async fn list_chapters(&self, document_id: &str) -> ReelsmithResult<Vec<Chapter>> {
        let state = self.state.read().await;
        let mut chapters: Vec<Chapter> = state
            .chapters
            .values()
            .filter(|c| c.document_id() == document_id)
            .cloned()
            .collect();
        chapters.sort_by_key(|c| *c.sequence());
        Ok(chapters)
    }

    #[instrument(skip(self, batch), fields(chapter_id = %batch.narration.chapter_id, shots = batch.shots.len()))]
    async fn create_narration_batch(&self, batch: NarrationBatch) -> ReelsmithResult<Narration> {
        let NarrationBatch {
            mut narration,
            scenes,
            shots,
        } = batch;

        if scenes.iter().any(|s| s.narration_id != narration.id) {
            return Err(invalid_batch("scene does not belong to the narration"));
        }
        if shots.iter().any(|s| s.narration_id != narration.id) {
            return Err(invalid_batch("shot does not belong to the narration"));
        }
        if let Some(orphan) = shots
            .iter()
            .find(|shot| !scenes.iter().any(|scene| scene.id == shot.scene_id))
        {
            return Err(invalid_batch(format!("shot {} has no scene", orphan.id)));
        }

        let mut state = self.state.write().await;
        if !state.chapters.contains_key(&narration.chapter_id) {
            return Err(not_found("chapter", &narration.chapter_id));
        }
        if state.narrations.contains_key(&narration.id) {
            return Err(invalid_batch(format!("narration {} already exists", narration.id)));
        }

        narration.version = state.next_narration_version(&narration.chapter_id);
        let now = Utc::now();
        narration.created_at = now;
        narration.updated_at = now;

        let stored = narration.clone();
        self.commit(&mut state, move |state| {
            for scene in scenes {
                state.scenes.insert(scene.id.clone(), scene);
            }
            for shot in shots {
                state.shots.insert(shot.id.clone(), shot);
            }
            state.narrations.insert(stored.id.clone(), stored);
            Ok(())
        })
        .await?;

        debug!(
            narration_id = %narration.id,
            version = narration.version,
            "Stored narration batch"
        );
        Ok(narration)
    }

    async fn get_narration(&self, id: &str) -> ReelsmithResult<Narration> {
        let state = self.state.read().await;
        state
            .narrations
            .get(id)
            .filter(|n| n.deleted_at.is_none())
            .cloned()
            .ok_or_else(|| not_found("narration", id))
    }

    async fn list_narrations(&self, chapter_id: &str) -> ReelsmithResult<Vec<Narration>> {
        let state = self.state.read().await;
        let mut narrations: Vec<Narration> = state
            .narrations
            .values()
            .filter(|n| n.chapter_id == chapter_id && n.deleted_at.is_none())
            .cloned()
            .collect();
        narrations.sort_by_key(|n| n.version);
        Ok(narrations)
    }

    async fn list_scenes(&self, narration_id: &str) -> ReelsmithResult<Vec<Scene>> {
        let state = self.state.read().await;
        let mut scenes: Vec<Scene> = state
            .scenes
            .values()
            .filter(|s| s.narration_id == narration_id && s.deleted_at.is_none())
            .cloned()
            .collect();
        scenes.sort_by_key(|s| s.sequence);
        Ok(scenes)
    }

    async fn list_shots(&self, narration_id: &str) -> ReelsmithResult<Vec<Shot>> {
        let state = self.state.read().await;
        let mut shots: Vec<Shot> = state
            .shots
            .values()
            .filter(|s| s.narration_id == narration_id && s.deleted_at.is_none())
            .cloned()
            .collect();
        shots.sort_by_key(|s| s.index);
        Ok(shots)
    }

    #[instrument(skip(self, artifacts), fields(count = artifacts.len()))]
    async fn create_artifacts(
        &self,
        chapter_id: &str,
        kind: VersionKind,
        artifacts: Vec<Artifact>,
    ) -> ReelsmithResult<Vec<Artifact>> {
        if artifacts.is_empty() {
            return Err(invalid_batch("no artifacts to create"));
        }
        if let Some(stray) = artifacts
            .iter()
            .find(|a| a.chapter_id != chapter_id || a.version_kind() != kind)
        {
            return Err(invalid_batch(format!(
                "artifact {} is not a {} record of chapter {}",
                stray.id, kind, chapter_id
            )));
        }

        let mut state = self.state.write().await;
        if !state.chapters.contains_key(chapter_id) {
            return Err(not_found("chapter", chapter_id));
        }
        if let Some(existing) = artifacts.iter().find(|a| state.artifacts.contains_key(&a.id)) {
            return Err(invalid_batch(format!("artifact {} already exists", existing.id)));
        }

        let version = state.next_artifact_version(chapter_id, kind);
        let now = Utc::now();
        let stored: Vec<Artifact> = artifacts
            .into_iter()
            .map(|mut artifact| {
                artifact.version = version;
                artifact.created_at = now;
                artifact.updated_at = now;
                artifact
            })
            .collect();
        self.commit(&mut state, |state| {
            for artifact in &stored {
                state.artifacts.insert(artifact.id.clone(), artifact.clone());
            }
            Ok(())
        })
        .await?;

        debug!(%kind, version, "Created artifact batch");
        Ok(stored)
    }

    async fn get_artifact(&self, id: &str) -> ReelsmithResult<Artifact> {
        let state = self.state.read().await;
        state
            .artifacts
            .get(id)
            .filter(|a| a.deleted_at.is_none())
            .cloned()
            .ok_or_else(|| not_found("artifact", id))
    }

    async fn list_artifacts(&self, filter: &ArtifactFilter) -> ReelsmithResult<Vec<Artifact>> {
        let state = self.state.read().await;
        let mut artifacts: Vec<Artifact> = state
            .artifacts
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        artifacts.sort_by_key(|a| (a.version, a.sequence));
        Ok(artifacts)
    }

    #[instrument(skip(self))]
    async fn transition_status(
        &self,
        id: &str,
        from: RecordStatus,
        to: RecordStatus,
    ) -> ReelsmithResult<Artifact> {
        let mut state = self.state.write().await;
        self.commit(&mut state, |state| {
            let artifact = state.live_artifact_mut(id)?;
            if artifact.status != from {
                return Err(RepositoryError::new(RepositoryErrorKind::StatusConflict {
                    id: id.to_string(),
                    expected: from.to_string(),
                    found: artifact.status.to_string(),
                })
                .into());
            }
            artifact.status = to;
            artifact.updated_at = Utc::now();
            Ok(artifact.clone())
        })
        .await
    }

    #[instrument(skip(self, media, details), fields(media_id = %media.id))]
    async fn complete_artifact(
        &self,
        id: &str,
        media: MediaReference,
        details: ArtifactDetails,
    ) -> ReelsmithResult<Artifact> {
        let mut state = self.state.write().await;
        self.commit(&mut state, move |state| {
            let artifact = open_artifact_mut(state, id)?;
            if details.kind() != artifact.kind() {
                return Err(invalid_batch(format!(
                    "{} details for {} artifact {}",
                    details.kind(),
                    artifact.kind(),
                    id
                )));
            }
            artifact.status = RecordStatus::Completed;
            artifact.media = Some(media);
            artifact.details = details;
            artifact.error_message = None;
            artifact.updated_at = Utc::now();
            Ok(artifact.clone())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn fail_artifact(&self, id: &str, message: &str) -> ReelsmithResult<Artifact> {
        let message = message.trim();
        let message = if message.is_empty() {
            GENERIC_FAILURE
        } else {
            message
        };
        let mut state = self.state.write().await;
        self.commit(&mut state, |state| {
            let artifact = open_artifact_mut(state, id)?;
            artifact.status = RecordStatus::Failed;
            artifact.error_message = Some(message.to_string());
            artifact.updated_at = Utc::now();
            Ok(artifact.clone())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_narration(&self, id: &str) -> ReelsmithResult<()> {
        let mut state = self.state.write().await;
        self.commit(&mut state, |state| {
            let now = Utc::now();
            let narration = state
                .narrations
                .get_mut(id)
                .filter(|n| n.deleted_at.is_none())
                .ok_or_else(|| not_found("narration", id))?;
            narration.deleted_at = Some(now);
            narration.updated_at = now;
            for scene in state.scenes.values_mut().filter(|s| s.narration_id == id) {
                scene.deleted_at.get_or_insert(now);
            }
            for shot in state.shots.values_mut().filter(|s| s.narration_id == id) {
                shot.deleted_at.get_or_insert(now);
            }
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_artifact(&self, id: &str) -> ReelsmithResult<()> {
        let mut state = self.state.write().await;
        self.commit(&mut state, |state| {
            let artifact = state.live_artifact_mut(id)?;
            let now = Utc::now();
            artifact.deleted_at = Some(now);
            artifact.updated_at = now;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, pointer), fields(chapter_id = %pointer.chapter_id, kind = %pointer.kind, version = pointer.version))]
    async fn set_current_version(&self, pointer: CurrentVersion) -> ReelsmithResult<()> {
        let mut state = self.state.write().await;
        if !state.chapters.contains_key(&pointer.chapter_id) {
            return Err(not_found("chapter", &pointer.chapter_id));
        }
        self.commit(&mut state, move |state| {
            match state
                .pointers
                .iter_mut()
                .find(|p| p.chapter_id == pointer.chapter_id && p.kind == pointer.kind)
            {
                Some(existing) => *existing = pointer,
                None => state.pointers.push(pointer),
            }
            Ok(())
        })
        .await
    }

    async fn current_version(
        &self,
        chapter_id: &str,
        kind: VersionKind,
    ) -> ReelsmithResult<Option<CurrentVersion>> {
        let state = self.state.read().await;
        Ok(state
            .pointers
            .iter()
            .find(|p| p.chapter_id == chapter_id && p.kind == kind)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelsmith_core::{Document, ShotBuilder};

    async fn seeded() -> (InMemoryPipelineRepository, Chapter) {
        let repo = InMemoryPipelineRepository::new();
        let document = Document::new("Tide", "The river rose.");
        let chapter = Chapter::new(&document.id, 1, "The river rose.");
        repo.insert_document(&document, std::slice::from_ref(&chapter))
            .await
            .unwrap();
        (repo, chapter)
    }

    fn image_artifact(chapter: &Chapter, sequence: u32) -> Artifact {
        Artifact::pending(
            chapter.id(),
            "narration",
            Some(format!("shot-{}", sequence)),
            sequence,
            ArtifactDetails::Image {
                prompt: "river".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_artifact_versions_increase_per_kind() {
        let (repo, chapter) = seeded().await;
        let first = repo
            .create_artifacts(chapter.id(), VersionKind::Image, vec![image_artifact(&chapter, 1)])
            .await
            .unwrap();
        let second = repo
            .create_artifacts(
                chapter.id(),
                VersionKind::Image,
                vec![image_artifact(&chapter, 1), image_artifact(&chapter, 2)],
            )
            .await
            .unwrap();
        assert_eq!(first[0].version, 1);
        assert!(second.iter().all(|a| a.version == 2));

        // Deleting the latest version does not free its number.
        repo.delete_artifact(&second[0].id).await.unwrap();
        repo.delete_artifact(&second[1].id).await.unwrap();
        let third = repo
            .create_artifacts(chapter.id(), VersionKind::Image, vec![image_artifact(&chapter, 1)])
            .await
            .unwrap();
        assert_eq!(third[0].version, 3);
    }

    #[tokio::test]
    async fn test_mismatched_kind_rejected() {
        let (repo, chapter) = seeded().await;
        let err = repo
            .create_artifacts(chapter.id(), VersionKind::Audio, vec![image_artifact(&chapter, 1)])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid batch"));
        assert_eq!(repo.len().await, 0);
    }

    #[tokio::test]
    async fn test_status_compare_and_swap() {
        let (repo, chapter) = seeded().await;
        let created = repo
            .create_artifacts(chapter.id(), VersionKind::Image, vec![image_artifact(&chapter, 1)])
            .await
            .unwrap();
        let id = &created[0].id;

        repo.transition_status(id, RecordStatus::Pending, RecordStatus::Processing)
            .await
            .unwrap();
        let err = repo
            .transition_status(id, RecordStatus::Pending, RecordStatus::Processing)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Status conflict"));
    }

    #[tokio::test]
    async fn test_failed_is_terminal_and_never_blank() {
        let (repo, chapter) = seeded().await;
        let created = repo
            .create_artifacts(chapter.id(), VersionKind::Image, vec![image_artifact(&chapter, 1)])
            .await
            .unwrap();
        let id = &created[0].id;

        let failed = repo.fail_artifact(id, "  ").await.unwrap();
        assert_eq!(failed.status, RecordStatus::Failed);
        assert_eq!(failed.error_message.as_deref(), Some(GENERIC_FAILURE));
        assert!(repo.fail_artifact(id, "again").await.is_err());
    }

    #[tokio::test]
    async fn test_orphan_shot_rejected() {
        let (repo, chapter) = seeded().await;
        let narration = Narration::new(chapter.id(), "prompt");
        let shot = ShotBuilder::default()
            .scene_id("missing")
            .narration_id(narration.id.clone())
            .chapter_id(chapter.id().clone())
            .sequence(1u32)
            .index(1u32)
            .narration("text")
            .image_prompt("img")
            .video_prompt("vid")
            .build()
            .unwrap();
        let err = repo
            .create_narration_batch(NarrationBatch {
                narration,
                scenes: Vec::new(),
                shots: vec![shot],
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("has no scene"));
        assert!(repo.list_narrations(chapter.id()).await.unwrap().is_empty());
    }
}
