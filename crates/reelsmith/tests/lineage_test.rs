//! Provider-free bookkeeping through the facade.

use reelsmith::{ReelsmithConfig, VersionKind, open_lineage};
use tempfile::TempDir;

fn config_with_snapshot(dir: &TempDir) -> ReelsmithConfig {
    let mut config = ReelsmithConfig::default();
    config.pipeline.snapshot_path = Some(dir.path().join("pipeline.json"));
    config.pipeline.storage_dir = dir.path().join("media");
    config
}

#[tokio::test]
async fn test_import_is_visible_to_later_commands() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let config = config_with_snapshot(&dir);

    let (document, chapters) = open_lineage(&config)
        .await?
        .import_document("Doc", "one\ntwo\nthree\n", 2)
        .await?;
    assert_eq!(chapters.len(), 2);

    // A fresh process reads the snapshot back.
    let lineage = open_lineage(&config).await?;
    let status = lineage.chapter_status(chapters[0].id()).await?;
    assert_eq!(status.chapter_id, *chapters[0].id());
    assert!(status.narration_versions.is_empty());

    let err = lineage
        .set_current_version(chapters[0].id(), VersionKind::Image, 1)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("image version not found"));
    assert!(!document.id.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_without_snapshot_nothing_persists() -> anyhow::Result<()> {
    let config = ReelsmithConfig::default();
    assert!(config.pipeline.snapshot_path.is_none());

    let (_, chapters) = open_lineage(&config)
        .await?
        .import_document("Doc", "text", 1)
        .await?;
    let err = open_lineage(&config)
        .await?
        .chapter_status(chapters[0].id())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
    Ok(())
}
