//! Core data model for the Reelsmith video asset pipeline.
//!
//! Documents are split into chapters, chapters receive versioned narration
//! scripts made of scenes and shots, and every shot accumulates versioned
//! artifacts (image, audio, subtitle, video). This crate holds those records
//! plus the script DTOs a language model is asked to produce.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod artifact;
mod document;
mod media;
mod narration;
mod script;
mod status;
mod telemetry;
mod timing;
mod version;

pub use artifact::{Artifact, ArtifactDetails, ArtifactKind, VideoType};
pub use document::{Chapter, Document, TextStats};
pub use media::{MediaReference, MediaType};
pub use narration::{Narration, Scene, Shot, ShotBuilder, ShotBuilderError};
pub use script::{ChapterInfo, Character, NarrationScript, SceneScript, ShotScript};
pub use status::RecordStatus;
pub use telemetry::{init_telemetry, shutdown_telemetry};
pub use timing::{CharTiming, WordTiming};
pub use version::{CurrentVersion, VersionKind};

/// Generate a fresh record identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
