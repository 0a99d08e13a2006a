//! Persistence contract for pipeline records.

use async_trait::async_trait;
use reelsmith_core::{
    Artifact, ArtifactDetails, Chapter, CurrentVersion, Document, MediaReference, Narration,
    RecordStatus, Scene, Shot, VersionKind,
};
use reelsmith_error::ReelsmithResult;

/// Narration plus the scenes and shots written with it in one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationBatch {
    /// Narration record; its version is assigned on insert
    pub narration: Narration,
    /// Scenes owned by the narration
    pub scenes: Vec<Scene>,
    /// Shots owned by the scenes
    pub shots: Vec<Shot>,
}

/// Filter for artifact queries. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactFilter {
    /// Owning chapter
    pub chapter_id: Option<String>,
    /// Owning narration
    pub narration_id: Option<String>,
    /// Owning shot
    pub shot_id: Option<String>,
    /// Version sequence
    pub kind: Option<VersionKind>,
    /// Version number
    pub version: Option<u32>,
    /// Status
    pub status: Option<RecordStatus>,
}

impl ArtifactFilter {
    /// Match artifacts of one chapter and version sequence.
    pub fn for_chapter(chapter_id: impl Into<String>, kind: VersionKind) -> Self {
        Self {
            chapter_id: Some(chapter_id.into()),
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Restrict to a version.
    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    /// Restrict to a status.
    pub fn status(mut self, status: RecordStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restrict to a narration.
    pub fn narration(mut self, narration_id: impl Into<String>) -> Self {
        self.narration_id = Some(narration_id.into());
        self
    }

    /// Whether `artifact` passes the filter.
    pub fn matches(&self, artifact: &Artifact) -> bool {
        if artifact.deleted_at.is_some() {
            return false;
        }
        if let Some(ref chapter_id) = self.chapter_id
            && &artifact.chapter_id != chapter_id
        {
            return false;
        }
        if let Some(ref narration_id) = self.narration_id
            && &artifact.narration_id != narration_id
        {
            return false;
        }
        if let Some(ref shot_id) = self.shot_id
            && artifact.shot_id.as_ref() != Some(shot_id)
        {
            return false;
        }
        if let Some(kind) = self.kind
            && artifact.version_kind() != kind
        {
            return false;
        }
        if let Some(version) = self.version
            && artifact.version != version
        {
            return false;
        }
        if let Some(status) = self.status
            && artifact.status != status
        {
            return false;
        }
        true
    }
}

/// Document-store contract used by the orchestrator.
///
/// Every read filters soft-deleted records. Batch inserts assign the next
/// version number for their (chapter, kind) pair atomically.
#[async_trait]
pub trait PipelineRepository: Send + Sync {
    /// Persist a document with its chapters.
    async fn insert_document(&self, document: &Document, chapters: &[Chapter])
    -> ReelsmithResult<()>;

    /// Load a document.
    async fn get_document(&self, id: &str) -> ReelsmithResult<Document>;

    /// Load a chapter.
    async fn get_chapter(&self, id: &str) -> ReelsmithResult<Chapter>;

    /// Chapters of a document ordered by sequence.
    async fn list_chapters(&self, document_id: &str) -> ReelsmithResult<Vec<Chapter>>;

    /// Insert a narration with its scenes and shots at the next narration
    /// version for the chapter. Returns the stored narration.
    async fn create_narration_batch(&self, batch: NarrationBatch) -> ReelsmithResult<Narration>;

    /// Load a narration.
    async fn get_narration(&self, id: &str) -> ReelsmithResult<Narration>;

    /// Narrations of a chapter ordered by version.
    async fn list_narrations(&self, chapter_id: &str) -> ReelsmithResult<Vec<Narration>>;

    /// Scenes of a narration ordered by sequence.
    async fn list_scenes(&self, narration_id: &str) -> ReelsmithResult<Vec<Scene>>;

    /// Shots of a narration ordered by global index.
    async fn list_shots(&self, narration_id: &str) -> ReelsmithResult<Vec<Shot>>;

    /// Insert artifacts of one kind at the next version for `chapter_id`.
    ///
    /// All records share the assigned version. Returns the stored records.
    async fn create_artifacts(
        &self,
        chapter_id: &str,
        kind: VersionKind,
        artifacts: Vec<Artifact>,
    ) -> ReelsmithResult<Vec<Artifact>>;

    /// Load an artifact.
    async fn get_artifact(&self, id: &str) -> ReelsmithResult<Artifact>;

    /// Artifacts matching `filter` ordered by (version, sequence).
    async fn list_artifacts(&self, filter: &ArtifactFilter) -> ReelsmithResult<Vec<Artifact>>;

    /// Move an artifact from `from` to `to`, failing if it is not in `from`.
    async fn transition_status(
        &self,
        id: &str,
        from: RecordStatus,
        to: RecordStatus,
    ) -> ReelsmithResult<Artifact>;

    /// Mark a non-terminal artifact completed with its stored media.
    async fn complete_artifact(
        &self,
        id: &str,
        media: MediaReference,
        details: ArtifactDetails,
    ) -> ReelsmithResult<Artifact>;

    /// Mark a non-terminal artifact failed. An empty message is replaced
    /// with a generic one.
    async fn fail_artifact(&self, id: &str, message: &str) -> ReelsmithResult<Artifact>;

    /// Soft-delete a narration with its scenes and shots.
    async fn delete_narration(&self, id: &str) -> ReelsmithResult<()>;

    /// Soft-delete an artifact.
    async fn delete_artifact(&self, id: &str) -> ReelsmithResult<()>;

    /// Rewrite the current-version pointer.
    async fn set_current_version(&self, pointer: CurrentVersion) -> ReelsmithResult<()>;

    /// Read the current-version pointer, if one was set.
    async fn current_version(
        &self,
        chapter_id: &str,
        kind: VersionKind,
    ) -> ReelsmithResult<Option<CurrentVersion>>;
}
