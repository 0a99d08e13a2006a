//! Generated artifacts attached to shots and chapters.

use crate::{CharTiming, MediaReference, MediaType, RecordStatus, VersionKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of generated artifact.
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
pub enum ArtifactKind {
    /// Still image for a shot
    Image,
    /// Narration audio for a shot
    Audio,
    /// Subtitle track for a shot
    Subtitle,
    /// Video clip for a shot, or the assembled chapter video
    Video,
}

impl ArtifactKind {
    /// Media type of the stored payload.
    pub fn media_type(&self) -> MediaType {
        match self {
            ArtifactKind::Image => MediaType::Image,
            ArtifactKind::Audio => MediaType::Audio,
            ArtifactKind::Subtitle => MediaType::Subtitle,
            ArtifactKind::Video => MediaType::Video,
        }
    }
}

/// Whether a video record is a per-shot clip or the assembled chapter video.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VideoType {
    /// One clip per shot
    PerShot,
    /// Chapter-level concatenation
    Final,
}

/// Kind-specific payload of an artifact record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArtifactDetails {
    /// Image generation input
    Image {
        /// Prompt sent to the image generator
        prompt: String,
    },
    /// Speech synthesis output
    Audio {
        /// Text sent to the synthesizer after cleaning
        text: String,
        /// Audio length in seconds
        duration_secs: Option<f64>,
        /// Per-character timings
        char_timings: Vec<CharTiming>,
    },
    /// Subtitle track
    Subtitle {
        /// Audio version the cues were timed against
        audio_version: u32,
        /// Number of cues written
        cue_count: usize,
    },
    /// Video clip or assembled video
    Video {
        /// Prompt sent to the video generator
        prompt: String,
        /// Requested clip length in seconds
        duration_secs: u32,
        /// Per-shot or final
        video_type: VideoType,
        /// Image version the clip was generated from
        image_version: Option<u32>,
        /// Per-shot video version a final video was assembled from
        source_video_version: Option<u32>,
    },
}

impl ArtifactDetails {
    /// The artifact kind these details belong to.
    pub fn kind(&self) -> ArtifactKind {
        match self {
            ArtifactDetails::Image { .. } => ArtifactKind::Image,
            ArtifactDetails::Audio { .. } => ArtifactKind::Audio,
            ArtifactDetails::Subtitle { .. } => ArtifactKind::Subtitle,
            ArtifactDetails::Video { .. } => ArtifactKind::Video,
        }
    }

    /// The video type, if these are video details.
    pub fn video_type(&self) -> Option<VideoType> {
        match self {
            ArtifactDetails::Video { video_type, .. } => Some(*video_type),
            _ => None,
        }
    }
}

/// A generated image, audio, subtitle or video record.
///
/// Versioned per (chapter, [`VersionKind`]); a record is never rewritten once
/// it reaches a terminal status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Record id
    pub id: String,
    /// Owning chapter
    pub chapter_id: String,
    /// Narration version the artifact was generated for
    pub narration_id: String,
    /// Shot the artifact belongs to; `None` for the final video
    pub shot_id: Option<String>,
    /// Shot index within the narration (0 for the final video)
    pub sequence: u32,
    /// Assigned by the repository on insert
    pub version: u32,
    /// Lifecycle status
    pub status: RecordStatus,
    /// Failure reason; non-empty whenever status is failed
    pub error_message: Option<String>,
    /// Stored payload once completed
    pub media: Option<MediaReference>,
    /// Kind-specific data
    pub details: ArtifactDetails,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Artifact {
    /// Create a pending artifact for a shot.
    pub fn pending(
        chapter_id: impl Into<String>,
        narration_id: impl Into<String>,
        shot_id: Option<String>,
        sequence: u32,
        details: ArtifactDetails,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::new_id(),
            chapter_id: chapter_id.into(),
            narration_id: narration_id.into(),
            shot_id,
            sequence,
            version: 0,
            status: RecordStatus::Pending,
            error_message: None,
            media: None,
            details,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Artifact kind, derived from the details.
    pub fn kind(&self) -> ArtifactKind {
        self.details.kind()
    }

    /// Version sequence this record is numbered in.
    ///
    /// # Examples
    ///
    /// ```
    /// use reelsmith_core::{Artifact, ArtifactDetails, VersionKind, VideoType};
    ///
    /// let final_video = Artifact::pending("c", "n", None, 0, ArtifactDetails::Video {
    ///     prompt: String::new(),
    ///     duration_secs: 0,
    ///     video_type: VideoType::Final,
    ///     image_version: None,
    ///     source_video_version: Some(2),
    /// });
    /// assert_eq!(final_video.version_kind(), VersionKind::FinalVideo);
    /// ```
    pub fn version_kind(&self) -> VersionKind {
        match &self.details {
            ArtifactDetails::Image { .. } => VersionKind::Image,
            ArtifactDetails::Audio { .. } => VersionKind::Audio,
            ArtifactDetails::Subtitle { .. } => VersionKind::Subtitle,
            ArtifactDetails::Video {
                video_type: crate::VideoType::Final,
                ..
            } => VersionKind::FinalVideo,
            ArtifactDetails::Video { .. } => VersionKind::Video,
        }
    }

    /// Whether the record is live and completed with stored media.
    pub fn is_usable(&self) -> bool {
        self.deleted_at.is_none() && self.status == RecordStatus::Completed && self.media.is_some()
    }
}
