//! End-to-end orchestrator tests against mock providers.

mod common;

use common::{MockImage, MockVideo, TWO_SHOT_SCRIPT, harness, narrated_chapter};
use reelsmith_core::{ArtifactDetails, RecordStatus, VersionKind, VideoType};
use reelsmith_error::{PipelineErrorKind, ReelsmithErrorKind};
use reelsmith_interface::{ArtifactFilter, CancellationToken, PipelineRepository};
use std::time::Duration;

fn failing_video() -> MockVideo {
    MockVideo {
        fail_on: Some("FAIL_VIDEO".to_string()),
        ..MockVideo::default()
    }
}

fn pipeline_kind(err: &reelsmith_error::ReelsmithError) -> Option<&PipelineErrorKind> {
    match err.kind() {
        ReelsmithErrorKind::Pipeline(e) => Some(&e.kind),
        _ => None,
    }
}

#[tokio::test]
async fn test_full_pipeline_produces_final_video() -> anyhow::Result<()> {
    let h = harness(TWO_SHOT_SCRIPT, MockImage::default(), MockVideo::default());
    let chapter_id = narrated_chapter(&h).await;
    let cancel = CancellationToken::new();

    let images = h.orchestrator.generate_images(&chapter_id, &cancel).await?;
    assert!(images.outcome().is_success());
    assert_eq!(*images.version(), 1);

    let audio = h.orchestrator.generate_audio(&chapter_id, &cancel).await?;
    assert!(audio.outcome().is_success());
    // Stage directions never reach the speech backend.
    let spoken = h.speech.texts.lock().unwrap().clone();
    assert!(spoken.contains(&"村民们逃往高处。".to_string()));

    let subtitles = h.orchestrator.generate_subtitles(&chapter_id, &cancel).await?;
    assert!(subtitles.outcome().is_success());

    let videos = h.orchestrator.generate_videos(&chapter_id, &cancel).await?;
    assert_eq!(videos.outcome().succeeded.len(), 2);
    {
        let requests = h.video.requests.lock().unwrap();
        assert!(requests.iter().all(|r| r.image_data_url.starts_with("data:image/png;base64,")));
        // 2.4s of audio rounds up to 3s clips.
        assert!(requests.iter().all(|r| r.duration_secs == 3));
    }

    let final_video = h
        .orchestrator
        .generate_final_video_for_chapter(&chapter_id)
        .await?;
    assert_eq!(final_video.status, RecordStatus::Completed);
    assert_eq!(final_video.version, 1);
    match &final_video.details {
        ArtifactDetails::Video {
            video_type,
            source_video_version,
            duration_secs,
            ..
        } => {
            assert_eq!(*video_type, VideoType::Final);
            assert_eq!(*source_video_version, Some(1));
            assert_eq!(*duration_secs, 6);
        }
        other => panic!("unexpected details: {:?}", other),
    }

    let calls = h.assembler.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 2);
    assert!(calls[0].iter().all(|clip| clip.audio.is_some()));
    Ok(())
}

#[tokio::test]
async fn test_failed_clip_blocks_final_assembly() -> anyhow::Result<()> {
    let h = harness(TWO_SHOT_SCRIPT, MockImage::default(), failing_video());
    let chapter_id = narrated_chapter(&h).await;
    let cancel = CancellationToken::new();

    h.orchestrator.generate_images(&chapter_id, &cancel).await?;
    let videos = h.orchestrator.generate_videos(&chapter_id, &cancel).await?;
    assert_eq!(videos.outcome().succeeded.len(), 1);
    assert_eq!(videos.outcome().failed.len(), 1);
    assert!(videos.outcome().failed[0].message.contains("render node crashed"));

    let failed = h
        .repository
        .list_artifacts(
            &ArtifactFilter::for_chapter(&chapter_id, VersionKind::Video)
                .status(RecordStatus::Failed),
        )
        .await?;
    assert_eq!(failed.len(), 1);
    assert!(failed[0].error_message.is_some());

    let err = h
        .orchestrator
        .generate_final_video_for_chapter(&chapter_id)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Missing narration videos for shots: 2"));

    let finals = h
        .repository
        .list_artifacts(&ArtifactFilter::for_chapter(&chapter_id, VersionKind::FinalVideo))
        .await?;
    assert!(finals.is_empty());
    assert!(h.assembler.calls.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_invalid_script_writes_nothing() -> anyhow::Result<()> {
    let h = harness(
        r#"{"chapter_info": {"title": "x"}, "characters": []}"#,
        MockImage::default(),
        MockVideo::default(),
    );
    let (_, chapters) = h
        .orchestrator
        .import_document("Doc", "Some chapter text.", 1)
        .await?;
    let chapter_id = chapters[0].id().clone();

    let err = h
        .orchestrator
        .generate_narration(&chapter_id)
        .await
        .unwrap_err();
    assert!(matches!(
        pipeline_kind(&err),
        Some(PipelineErrorKind::Validation(_))
    ));
    assert!(h.repository.list_narrations(&chapter_id).await?.is_empty());

    h.text.set_response("I cannot help with that.");
    let err = h
        .orchestrator
        .generate_narration(&chapter_id)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No JSON object found"));
    assert!(h.repository.list_narrations(&chapter_id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_regeneration_adds_versions_without_touching_old_shots() -> anyhow::Result<()> {
    let h = harness(TWO_SHOT_SCRIPT, MockImage::default(), MockVideo::default());
    let chapter_id = narrated_chapter(&h).await;
    let first = h.orchestrator.current_narration(&chapter_id).await?;
    let first_shots = h.repository.list_shots(&first.id).await?;

    h.text.set_response(
        r#"{"scenes": [{"scene_number": 1, "shots": [{"narration": "一切归于平静。"}]}]}"#,
    );
    let second = h.orchestrator.generate_narration(&chapter_id).await?;
    assert_eq!(first.version, 1);
    assert_eq!(second.version, 2);

    assert_eq!(h.repository.list_shots(&first.id).await?, first_shots);
    assert_eq!(h.repository.list_shots(&second.id).await?.len(), 1);
    assert_eq!(
        h.orchestrator.current_narration(&chapter_id).await?.id,
        second.id
    );
    Ok(())
}

#[tokio::test]
async fn test_set_current_version_selects_and_validates() -> anyhow::Result<()> {
    let h = harness(TWO_SHOT_SCRIPT, MockImage::default(), MockVideo::default());
    let chapter_id = narrated_chapter(&h).await;
    let cancel = CancellationToken::new();

    h.orchestrator.generate_images(&chapter_id, &cancel).await?;
    h.orchestrator.generate_images(&chapter_id, &cancel).await?;
    assert_eq!(
        h.orchestrator
            .resolve_version(&chapter_id, VersionKind::Image)
            .await?,
        Some(2)
    );

    h.orchestrator
        .set_current_version(&chapter_id, VersionKind::Image, 1)
        .await?;
    assert_eq!(
        h.orchestrator
            .resolve_version(&chapter_id, VersionKind::Image)
            .await?,
        Some(1)
    );

    let err = h
        .orchestrator
        .set_current_version(&chapter_id, VersionKind::Image, 9)
        .await
        .unwrap_err();
    assert!(matches!(
        pipeline_kind(&err),
        Some(PipelineErrorKind::NotFound { .. })
    ));

    let err = h
        .orchestrator
        .set_current_version("no-such-chapter", VersionKind::Image, 1)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no-such-chapter"));

    // Videos use the selected image version.
    let videos = h.orchestrator.generate_videos(&chapter_id, &cancel).await?;
    let records = h
        .repository
        .list_artifacts(
            &ArtifactFilter::for_chapter(&chapter_id, VersionKind::Video)
                .version(*videos.version()),
        )
        .await?;
    assert!(records.iter().all(|a| matches!(
        a.details,
        ArtifactDetails::Video {
            image_version: Some(1),
            ..
        }
    )));
    Ok(())
}

#[tokio::test]
async fn test_subtitles_require_audio() -> anyhow::Result<()> {
    let h = harness(TWO_SHOT_SCRIPT, MockImage::default(), MockVideo::default());
    let chapter_id = narrated_chapter(&h).await;

    let err = h
        .orchestrator
        .generate_subtitles(&chapter_id, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        pipeline_kind(&err),
        Some(PipelineErrorKind::NoVersion { .. })
    ));
    let records = h
        .repository
        .list_artifacts(&ArtifactFilter::for_chapter(&chapter_id, VersionKind::Subtitle))
        .await?;
    assert!(records.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_trigger_returns_receipt_then_completes() -> anyhow::Result<()> {
    let h = harness(TWO_SHOT_SCRIPT, MockImage::default(), MockVideo::default());
    let chapter_id = narrated_chapter(&h).await;

    let receipt = h
        .orchestrator
        .trigger_images(&chapter_id, CancellationToken::new())
        .await?;
    assert_eq!(*receipt.kind(), VersionKind::Image);
    assert_eq!(*receipt.version(), 1);
    assert_eq!(receipt.artifact_ids().len(), 2);

    let ids = receipt.artifact_ids().clone();
    let batch = receipt.wait().await?;
    assert!(batch.outcome().is_success());
    for id in ids {
        let artifact = h.repository.get_artifact(&id).await?;
        assert_eq!(artifact.status, RecordStatus::Completed);
        assert!(artifact.media.is_some());
    }
    Ok(())
}

#[tokio::test]
async fn test_cancellation_fails_pending_records() -> anyhow::Result<()> {
    let slow = MockImage {
        delay: Some(Duration::from_secs(30)),
        ..MockImage::default()
    };
    let h = harness(TWO_SHOT_SCRIPT, slow, MockVideo::default());
    let chapter_id = narrated_chapter(&h).await;

    let cancel = CancellationToken::new();
    let receipt = h
        .orchestrator
        .trigger_images(&chapter_id, cancel.clone())
        .await?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let batch = tokio::time::timeout(Duration::from_secs(5), receipt.wait()).await??;
    assert_eq!(batch.outcome().failed.len(), 2);

    let records = h
        .repository
        .list_artifacts(&ArtifactFilter::for_chapter(&chapter_id, VersionKind::Image))
        .await?;
    assert_eq!(records.len(), 2);
    for record in records {
        assert_eq!(record.status, RecordStatus::Failed);
        assert_eq!(record.error_message.as_deref(), Some("cancelled"));
    }
    Ok(())
}

#[tokio::test]
async fn test_cancellation_fails_processing_videos() -> anyhow::Result<()> {
    let slow = MockVideo {
        delay: Some(Duration::from_secs(30)),
        ..MockVideo::default()
    };
    let h = harness(TWO_SHOT_SCRIPT, MockImage::default(), slow);
    let chapter_id = narrated_chapter(&h).await;
    h.orchestrator
        .generate_images(&chapter_id, &CancellationToken::new())
        .await?;

    let cancel = CancellationToken::new();
    let receipt = h
        .orchestrator
        .trigger_videos(&chapter_id, cancel.clone())
        .await?;
    let filter = ArtifactFilter::for_chapter(&chapter_id, VersionKind::Video);

    // Wait until both records are claimed and the provider calls are in flight.
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let records = h.repository.list_artifacts(&filter).await.unwrap();
            let claimed = records
                .iter()
                .all(|r| r.status == RecordStatus::Processing);
            if claimed && h.video.requests.lock().unwrap().len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await?;
    cancel.cancel();

    let batch = tokio::time::timeout(Duration::from_secs(5), receipt.wait()).await??;
    assert_eq!(batch.outcome().failed.len(), 2);

    let records = h.repository.list_artifacts(&filter).await?;
    assert_eq!(records.len(), 2);
    for record in records {
        assert_eq!(record.status, RecordStatus::Failed);
        assert_eq!(record.error_message.as_deref(), Some("cancelled"));
    }
    Ok(())
}

#[tokio::test]
async fn test_provider_timeout_marks_record_timed_out() -> anyhow::Result<()> {
    let stalls = MockVideo {
        time_out_on: Some("FAIL_VIDEO".to_string()),
        ..MockVideo::default()
    };
    let h = harness(TWO_SHOT_SCRIPT, MockImage::default(), stalls);
    let chapter_id = narrated_chapter(&h).await;
    let cancel = CancellationToken::new();
    h.orchestrator.generate_images(&chapter_id, &cancel).await?;

    let batch = h.orchestrator.generate_videos(&chapter_id, &cancel).await?;
    assert_eq!(batch.outcome().succeeded.len(), 1);
    assert_eq!(batch.outcome().failed.len(), 1);

    let records = h
        .repository
        .list_artifacts(&ArtifactFilter::for_chapter(&chapter_id, VersionKind::Video))
        .await?;
    let timed_out = records
        .iter()
        .find(|r| r.status == RecordStatus::Failed)
        .expect("one failed record");
    let message = timed_out.error_message.as_deref().unwrap_or_default();
    assert!(message.starts_with("timed out: "), "message: {message}");
    assert!(message.contains("cgt-slow"));
    assert!(records.iter().any(|r| r.status == RecordStatus::Completed));
    Ok(())
}

#[tokio::test]
async fn test_chapter_status_counts_current_version() -> anyhow::Result<()> {
    let h = harness(TWO_SHOT_SCRIPT, MockImage::default(), failing_video());
    let chapter_id = narrated_chapter(&h).await;
    let cancel = CancellationToken::new();

    h.orchestrator.generate_images(&chapter_id, &cancel).await?;
    h.orchestrator.generate_videos(&chapter_id, &cancel).await?;

    let status = h.orchestrator.chapter_status(&chapter_id).await?;
    assert_eq!(status.narration_versions, vec![1]);
    assert_eq!(status.current_narration, Some(1));

    let video = status
        .kinds
        .iter()
        .find(|k| k.kind == VersionKind::Video)
        .unwrap();
    assert_eq!(video.current, Some(1));
    assert_eq!(video.counts.completed, 1);
    assert_eq!(video.counts.failed, 1);

    let audio = status
        .kinds
        .iter()
        .find(|k| k.kind == VersionKind::Audio)
        .unwrap();
    assert_eq!(audio.current, None);
    assert_eq!(audio.counts.total(), 0);
    Ok(())
}

#[tokio::test]
async fn test_document_narration_reports_each_chapter() -> anyhow::Result<()> {
    let h = harness(TWO_SHOT_SCRIPT, MockImage::default(), MockVideo::default());
    let (document, chapters) = h
        .orchestrator
        .import_document("Doc", "First line.\nSecond line.\nThird line.\n", 3)
        .await?;
    assert_eq!(chapters.len(), 3);

    let outcome = h
        .orchestrator
        .generate_narrations_for_document(&document.id)
        .await?;
    assert_eq!(outcome.succeeded.len(), 3);
    assert!(outcome.failed.is_empty());
    assert_eq!(*h.text.calls.lock().unwrap(), 3);
    Ok(())
}
