//! Results returned by orchestrator operations.

use reelsmith_core::{RecordStatus, VersionKind};
use reelsmith_error::{PipelineError, PipelineErrorKind, ReelsmithResult};
use serde::Serialize;
use tokio::task::JoinHandle;

/// One item that failed inside a batch operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    /// Record or chapter id
    pub id: String,
    /// Failure reason
    pub message: String,
}

/// Aggregate result of a batch that continues past individual failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    /// Ids that succeeded
    pub succeeded: Vec<String>,
    /// Ids that failed, with reasons
    pub failed: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub(crate) fn succeed(&mut self, id: impl Into<String>) {
        self.succeeded.push(id.into());
    }

    pub(crate) fn fail(&mut self, id: impl Into<String>, message: impl Into<String>) {
        self.failed.push(BatchFailure {
            id: id.into(),
            message: message.into(),
        });
    }

    /// Number of items attempted.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// True when nothing failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Result of one per-shot asset operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_getters::Getters)]
pub struct AssetBatch {
    /// Version sequence the records were created in
    kind: VersionKind,
    /// Version shared by every record of the batch
    version: u32,
    /// Per-record outcome, keyed by artifact id
    outcome: BatchOutcome,
}

impl AssetBatch {
    pub(crate) fn new(kind: VersionKind, version: u32, outcome: BatchOutcome) -> Self {
        Self {
            kind,
            version,
            outcome,
        }
    }
}

/// Handle returned by the `trigger_*` operations.
///
/// The pending records already exist when this is returned; generation
/// continues in a background task.
#[derive(Debug, derive_getters::Getters)]
pub struct TriggerReceipt {
    /// Version sequence of the new records
    kind: VersionKind,
    /// Assigned version
    version: u32,
    /// Pending record ids in shot order
    artifact_ids: Vec<String>,
    #[getter(skip)]
    task: JoinHandle<AssetBatch>,
}

impl TriggerReceipt {
    pub(crate) fn new(
        kind: VersionKind,
        version: u32,
        artifact_ids: Vec<String>,
        task: JoinHandle<AssetBatch>,
    ) -> Self {
        Self {
            kind,
            version,
            artifact_ids,
            task,
        }
    }

    /// Wait for the background generation to finish.
    ///
    /// # Errors
    ///
    /// Returns a cancellation error if the task was aborted or panicked.
    pub async fn wait(self) -> ReelsmithResult<AssetBatch> {
        self.task.await.map_err(|e| {
            tracing::error!(error = %e, "Generation task did not finish");
            PipelineError::new(PipelineErrorKind::Cancelled).into()
        })
    }
}

/// Record counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Pending records
    pub pending: usize,
    /// Records with a provider job in flight
    pub processing: usize,
    /// Completed records
    pub completed: usize,
    /// Failed records
    pub failed: usize,
}

impl StatusCounts {
    pub(crate) fn add(&mut self, status: RecordStatus) {
        match status {
            RecordStatus::Pending => self.pending += 1,
            RecordStatus::Processing => self.processing += 1,
            RecordStatus::Completed => self.completed += 1,
            RecordStatus::Failed => self.failed += 1,
        }
    }

    /// Total records counted.
    pub fn total(&self) -> usize {
        self.pending + self.processing + self.completed + self.failed
    }
}

/// Versions and status of one version sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindSummary {
    /// Version sequence
    pub kind: VersionKind,
    /// Version used by downstream stages, if any
    pub current: Option<u32>,
    /// Highest existing version
    pub latest: Option<u32>,
    /// Status counts of the current version (or the latest when none is usable)
    pub counts: StatusCounts,
}

/// Overview of a chapter's pipeline state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterStatus {
    /// Chapter id
    pub chapter_id: String,
    /// Narration versions in ascending order
    pub narration_versions: Vec<u32>,
    /// Current narration version
    pub current_narration: Option<u32>,
    /// One summary per artifact version sequence
    pub kinds: Vec<KindSummary>,
}
