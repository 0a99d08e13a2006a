//! Tests for record status, version kinds and text statistics.

use reelsmith_core::{
    Artifact, ArtifactDetails, ArtifactKind, Chapter, RecordStatus, TextStats, VersionKind,
    VideoType,
};
use std::str::FromStr;

#[test]
fn test_status_round_trips_through_strings() {
    for status in [
        RecordStatus::Pending,
        RecordStatus::Processing,
        RecordStatus::Completed,
        RecordStatus::Failed,
    ] {
        let text = status.to_string();
        assert_eq!(RecordStatus::from_str(&text).unwrap(), status);
    }
}

#[test]
fn test_status_serializes_snake_case() {
    let json = serde_json::to_string(&RecordStatus::Processing).unwrap();
    assert_eq!(json, "\"processing\"");
}

#[test]
fn test_version_kind_parses_final_video() {
    assert_eq!(
        VersionKind::from_str("final_video").unwrap(),
        VersionKind::FinalVideo
    );
}

#[test]
fn test_pending_artifact_defaults() {
    let artifact = Artifact::pending(
        "chapter",
        "narration",
        Some("shot".to_string()),
        3,
        ArtifactDetails::Video {
            prompt: "pan".to_string(),
            duration_secs: 5,
            video_type: VideoType::PerShot,
            image_version: Some(1),
            source_video_version: None,
        },
    );
    assert_eq!(artifact.status, RecordStatus::Pending);
    assert_eq!(artifact.kind(), ArtifactKind::Video);
    assert_eq!(artifact.version_kind(), VersionKind::Video);
    assert!(!artifact.is_usable());
}

#[test]
fn test_chapter_counts_mixed_text() {
    let chapter = Chapter::new("doc", 1, "第一章\nIt begins here.");
    assert_eq!(chapter.stats().line_count, 2);
    assert_eq!(chapter.stats().word_count, 6);
    assert_eq!(*chapter.sequence(), 1);
}

#[test]
fn test_empty_text_stats() {
    assert_eq!(TextStats::from_text(""), TextStats::default());
}
