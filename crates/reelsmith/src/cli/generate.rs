//! Handlers that call providers.

use reelsmith::{
    AssetBatch, BatchOutcome, CancellationToken, MediaStorage, Orchestrator, PipelineRepository,
    ReelsmithConfig, ReelsmithResult, build_orchestrator,
};
use tracing::{info, warn};

/// Cancel `token` on Ctrl-C so in-flight records are marked failed.
fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; cancelling in-flight generation");
            token.cancel();
        }
    });
}

/// Per-shot asset kinds the CLI can generate.
#[derive(Debug, Clone, Copy)]
pub enum AssetArg {
    /// Still images
    Images,
    /// Narration audio
    Audio,
    /// SRT subtitles
    Subtitles,
    /// Image-to-video clips
    Videos,
}

fn print_outcome(label: &str, outcome: &BatchOutcome) {
    println!(
        "{}: {} succeeded, {} failed",
        label,
        outcome.succeeded.len(),
        outcome.failed.len()
    );
    for failure in &outcome.failed {
        println!("  {}  {}", failure.id, failure.message);
    }
}

/// Generate narration for a chapter or for every chapter of a document.
pub async fn narrate(
    config: &ReelsmithConfig,
    chapter: Option<&str>,
    document: Option<&str>,
) -> ReelsmithResult<()> {
    let orchestrator = build_orchestrator(config).await?;
    if let Some(document) = document {
        let outcome = orchestrator
            .generate_narrations_for_document(document)
            .await?;
        print_outcome("Narration", &outcome);
        return Ok(());
    }
    if let Some(chapter) = chapter {
        let narration = orchestrator.generate_narration(chapter).await?;
        let shots = orchestrator.repository().list_shots(&narration.id).await?;
        println!(
            "Narration {} (version {}) with {} shots",
            narration.id,
            narration.version,
            shots.len()
        );
    }
    Ok(())
}

async fn run_asset(
    orchestrator: &Orchestrator,
    asset: AssetArg,
    chapter: &str,
    cancel: &CancellationToken,
) -> ReelsmithResult<AssetBatch> {
    match asset {
        AssetArg::Images => orchestrator.generate_images(chapter, cancel).await,
        AssetArg::Audio => orchestrator.generate_audio(chapter, cancel).await,
        AssetArg::Subtitles => orchestrator.generate_subtitles(chapter, cancel).await,
        AssetArg::Videos => orchestrator.generate_videos(chapter, cancel).await,
    }
}

/// Generate one per-shot asset kind for a chapter.
pub async fn generate_assets(
    config: &ReelsmithConfig,
    asset: AssetArg,
    chapter: &str,
) -> ReelsmithResult<()> {
    let orchestrator = build_orchestrator(config).await?;
    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());

    let batch = run_asset(&orchestrator, asset, chapter, &cancel).await?;
    info!(kind = %batch.kind(), version = batch.version(), "Generation finished");
    print_outcome(
        &format!("{} v{}", batch.kind(), batch.version()),
        batch.outcome(),
    );
    Ok(())
}

/// Assemble the final chapter video.
pub async fn assemble(config: &ReelsmithConfig, chapter: &str) -> ReelsmithResult<()> {
    let orchestrator = build_orchestrator(config).await?;
    let artifact = orchestrator.generate_final_video_for_chapter(chapter).await?;
    let path = artifact
        .media
        .as_ref()
        .and_then(|media| orchestrator.storage().local_path(media));
    match path {
        Some(path) => println!(
            "Final video v{} written to {}",
            artifact.version,
            path.display()
        ),
        None => println!("Final video v{} stored as {}", artifact.version, artifact.id),
    }
    Ok(())
}
