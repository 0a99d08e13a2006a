//! Narration versions and the scenes and shots they own.

use crate::{ChapterInfo, Character, RecordStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One generated script version for a chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narration {
    /// Record id
    pub id: String,
    /// Owning chapter
    pub chapter_id: String,
    /// Monotonic per chapter, assigned by the repository on insert
    pub version: u32,
    /// Lifecycle status
    pub status: RecordStatus,
    /// Prompt sent to the text generator
    pub prompt: String,
    /// Raw text returned by the model
    pub raw_response: String,
    /// Chapter title and summary from the script
    pub chapter_info: Option<ChapterInfo>,
    /// Characters listed in the script
    pub characters: Vec<Character>,
    /// Failure reason when status is failed
    pub error_message: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Narration {
    /// Create a completed narration. The version is filled in on insert.
    pub fn new(chapter_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: crate::new_id(),
            chapter_id: chapter_id.into(),
            version: 0,
            status: RecordStatus::Completed,
            prompt: prompt.into(),
            raw_response: String::new(),
            chapter_info: None,
            characters: Vec::new(),
            error_message: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Ordered group of shots inside one narration version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Record id
    pub id: String,
    /// Owning narration
    pub narration_id: String,
    /// Owning chapter
    pub chapter_id: String,
    /// Scene label from the script
    pub scene_number: String,
    /// 1-based position within the narration
    pub sequence: u32,
    /// Optional scene description
    pub description: Option<String>,
    /// Lifecycle status
    pub status: RecordStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Scene {
    /// Create a completed scene record.
    pub fn new(
        narration_id: impl Into<String>,
        chapter_id: impl Into<String>,
        scene_number: impl Into<String>,
        sequence: u32,
    ) -> Self {
        Self {
            id: crate::new_id(),
            narration_id: narration_id.into(),
            chapter_id: chapter_id.into(),
            scene_number: scene_number.into(),
            sequence,
            description: None,
            status: RecordStatus::Completed,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }
}

/// The smallest generation unit: one narrated beat.
///
/// # Examples
///
/// ```
/// use reelsmith_core::ShotBuilder;
///
/// let shot = ShotBuilder::default()
///     .scene_id("scene")
///     .narration_id("narration")
///     .chapter_id("chapter")
///     .sequence(1u32)
///     .index(1u32)
///     .narration("The river rose at dawn.")
///     .image_prompt("a flooded valley at sunrise")
///     .video_prompt("slow pan across the water")
///     .build()
///     .unwrap();
/// assert_eq!(shot.index, 1);
/// assert!(shot.content_flags.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct Shot {
    /// Record id
    #[builder(default = "crate::new_id()")]
    pub id: String,
    /// Owning scene
    pub scene_id: String,
    /// Owning narration
    pub narration_id: String,
    /// Owning chapter
    pub chapter_id: String,
    /// 1-based position within the scene
    pub sequence: u32,
    /// 1-based position within the narration
    pub index: u32,
    /// Narrated text
    pub narration: String,
    /// Prompt for the still image
    pub image_prompt: String,
    /// Prompt for the video clip
    pub video_prompt: String,
    /// Camera-movement hint
    #[builder(default)]
    pub camera_movement: Option<String>,
    /// Suggested duration in seconds
    #[builder(default)]
    pub duration_hint: Option<f64>,
    /// Lifecycle status
    #[builder(default = "RecordStatus::Completed")]
    pub status: RecordStatus,
    /// Failure reason when status is failed
    #[builder(default)]
    pub error_message: Option<String>,
    /// Terms the content filter flagged as warnings
    #[builder(default)]
    pub content_flags: Vec<String>,
    /// Creation time
    #[builder(default = "Utc::now()")]
    pub created_at: DateTime<Utc>,
    /// Soft-delete marker
    #[builder(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}
