//! Version kinds and current-version pointers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Independent version sequences kept per chapter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VersionKind {
    /// Narration scripts
    Narration,
    /// Per-shot images
    Image,
    /// Per-shot narration audio
    Audio,
    /// Per-shot subtitles
    Subtitle,
    /// Per-shot videos
    Video,
    /// Chapter-level assembled video
    FinalVideo,
}

/// The version selected as current for a (chapter, kind) pair.
///
/// Stored separately from the versioned records; rewriting it never touches
/// record content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentVersion {
    /// Chapter the pointer belongs to
    pub chapter_id: String,
    /// Which version sequence
    pub kind: VersionKind,
    /// Selected version number
    pub version: u32,
    /// When the pointer was last rewritten
    pub updated_at: DateTime<Utc>,
}
