//! Snapshot persistence for the in-memory repository.

use reelsmith_core::{
    Artifact, ArtifactDetails, Chapter, CurrentVersion, Document, Narration, VersionKind,
};
use reelsmith_interface::{ArtifactFilter, NarrationBatch, PipelineRepository};
use reelsmith_pipeline::InMemoryPipelineRepository;
use tempfile::TempDir;

#[tokio::test]
async fn test_snapshot_survives_reopen() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("state").join("pipeline.json");

    let repo = InMemoryPipelineRepository::open(&path).await?;
    assert!(repo.is_empty().await);

    let document = Document::new("Doc", "text");
    let chapter = Chapter::new(&document.id, 1, "text");
    repo.insert_document(&document, std::slice::from_ref(&chapter))
        .await?;
    let created = repo
        .create_artifacts(
            chapter.id(),
            VersionKind::Image,
            vec![Artifact::pending(
                chapter.id(),
                "narration-1",
                Some("shot-1".to_string()),
                1,
                ArtifactDetails::Image {
                    prompt: "river".to_string(),
                },
            )],
        )
        .await?;
    repo.fail_artifact(&created[0].id, "").await?;
    repo.set_current_version(CurrentVersion {
        chapter_id: chapter.id().clone(),
        kind: VersionKind::Image,
        version: 1,
        updated_at: chrono::Utc::now(),
    })
    .await?;
    assert!(path.exists());

    let reopened = InMemoryPipelineRepository::open(&path).await?;
    assert_eq!(reopened.get_document(&document.id).await?.title, "Doc");
    assert_eq!(reopened.list_chapters(&document.id).await?.len(), 1);

    let artifacts = reopened
        .list_artifacts(&ArtifactFilter::for_chapter(chapter.id(), VersionKind::Image))
        .await?;
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].error_message.as_deref(), Some("generation failed"));

    let pointer = reopened
        .current_version(chapter.id(), VersionKind::Image)
        .await?
        .expect("pointer persisted");
    assert_eq!(pointer.version, 1);
    Ok(())
}

#[tokio::test]
async fn test_corrupt_snapshot_is_rejected() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("pipeline.json");
    tokio::fs::write(&path, b"{not json").await?;

    let err = InMemoryPipelineRepository::open(&path).await.unwrap_err();
    assert!(err.to_string().contains("Failed to parse snapshot"));
    Ok(())
}

#[tokio::test]
async fn test_failed_flush_leaves_state_untouched() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("snap.json");
    let repo = InMemoryPipelineRepository::open(&path).await?;

    let document = Document::new("Doc", "text");
    let chapter = Chapter::new(&document.id, 1, "text");
    repo.insert_document(&document, std::slice::from_ref(&chapter))
        .await?;

    // The staging file cannot be written while a directory sits at its path.
    let staging = dir.path().join("snap.json.tmp");
    tokio::fs::create_dir(&staging).await?;
    let result = repo
        .create_narration_batch(NarrationBatch {
            narration: Narration::new(chapter.id(), "prompt"),
            scenes: Vec::new(),
            shots: Vec::new(),
        })
        .await;
    assert!(result.is_err());
    assert!(repo.list_narrations(chapter.id()).await?.is_empty());

    let pending = Artifact::pending(
        chapter.id(),
        "narration-1",
        Some("shot-1".to_string()),
        1,
        ArtifactDetails::Image {
            prompt: "river".to_string(),
        },
    );
    assert!(
        repo.create_artifacts(chapter.id(), VersionKind::Image, vec![pending.clone()])
            .await
            .is_err()
    );
    assert_eq!(repo.len().await, 0);

    // Once the path is clear, version numbering resumes as if nothing happened.
    tokio::fs::remove_dir(&staging).await?;
    let narration = repo
        .create_narration_batch(NarrationBatch {
            narration: Narration::new(chapter.id(), "prompt"),
            scenes: Vec::new(),
            shots: Vec::new(),
        })
        .await?;
    assert_eq!(narration.version, 1);
    let created = repo
        .create_artifacts(chapter.id(), VersionKind::Image, vec![pending])
        .await?;
    assert_eq!(created[0].version, 1);

    let reopened = InMemoryPipelineRepository::open(&path).await?;
    assert_eq!(reopened.list_narrations(chapter.id()).await?.len(), 1);
    Ok(())
}
