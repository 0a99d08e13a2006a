//! Handlers that only touch records, never providers.

use super::commands::{DeleteCommands, OutputFormat};
use reelsmith::{
    ChapterStatus, JsonError, PipelineError, PipelineErrorKind, ReelsmithConfig, ReelsmithResult,
    VersionKind, open_lineage,
};
use std::path::Path;

/// Import a text file as a document.
pub async fn import_document(
    config: &ReelsmithConfig,
    title: &str,
    file: &Path,
    chapters: usize,
) -> ReelsmithResult<()> {
    let text = tokio::fs::read_to_string(file).await.map_err(|e| {
        PipelineError::new(PipelineErrorKind::Validation(format!(
            "Cannot read {}: {}",
            file.display(),
            e
        )))
    })?;

    let lineage = open_lineage(config).await?;
    let (document, chapters) = lineage.import_document(title, &text, chapters).await?;

    println!("Document {} ({})", document.id, document.title);
    for chapter in &chapters {
        println!(
            "  chapter {:>3}  {}  {} chars",
            chapter.sequence(),
            chapter.id(),
            chapter.text().chars().count()
        );
    }
    Ok(())
}

/// Point `kind` at `version` for a chapter.
pub async fn select_version(
    config: &ReelsmithConfig,
    chapter: &str,
    kind: VersionKind,
    version: u32,
) -> ReelsmithResult<()> {
    open_lineage(config)
        .await?
        .set_current_version(chapter, kind, version)
        .await?;
    println!("{} version {} is now current for chapter {}", kind, version, chapter);
    Ok(())
}

/// Print the version summary of a chapter.
pub async fn show_status(
    config: &ReelsmithConfig,
    chapter: &str,
    format: OutputFormat,
) -> ReelsmithResult<()> {
    let status = open_lineage(config).await?.chapter_status(chapter).await?;
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&status)
                .map_err(|e| JsonError::new(e.to_string()))?;
            println!("{}", json);
        }
        OutputFormat::Human => print_status(&status),
    }
    Ok(())
}

fn version_label(version: Option<u32>) -> String {
    version.map_or_else(|| "-".to_string(), |v| format!("v{}", v))
}

fn print_status(status: &ChapterStatus) {
    println!("Chapter {}", status.chapter_id);
    println!(
        "  narration    current {:<4} versions {:?}",
        version_label(status.current_narration),
        status.narration_versions
    );
    println!("{:-<72}", "");
    println!(
        "  {:<12} {:>7} {:>7} {:>8} {:>10} {:>9} {:>7}",
        "kind", "current", "latest", "pending", "processing", "completed", "failed"
    );
    for summary in &status.kinds {
        println!(
            "  {:<12} {:>7} {:>7} {:>8} {:>10} {:>9} {:>7}",
            summary.kind.to_string(),
            version_label(summary.current),
            version_label(summary.latest),
            summary.counts.pending,
            summary.counts.processing,
            summary.counts.completed,
            summary.counts.failed
        );
    }
}

/// Soft-delete a narration or an artifact.
pub async fn delete(config: &ReelsmithConfig, command: DeleteCommands) -> ReelsmithResult<()> {
    let lineage = open_lineage(config).await?;
    match command {
        DeleteCommands::Narration { id } => {
            lineage.delete_narration(&id).await?;
            println!("Deleted narration {}", id);
        }
        DeleteCommands::Artifact { id } => {
            lineage.delete_artifact(&id).await?;
            println!("Deleted artifact {}", id);
        }
    }
    Ok(())
}
