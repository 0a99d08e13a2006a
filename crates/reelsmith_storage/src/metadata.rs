//! Media metadata types.

use reelsmith_core::MediaType;

/// Metadata about media being stored.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaMetadata {
    /// Type of media
    pub media_type: MediaType,
    /// MIME type (e.g., "image/png", "video/mp4")
    pub mime_type: String,
    /// Audio/video duration in seconds
    pub duration_seconds: Option<f64>,
}

impl MediaMetadata {
    /// Metadata with no duration.
    pub fn new(media_type: MediaType, mime_type: impl Into<String>) -> Self {
        Self {
            media_type,
            mime_type: mime_type.into(),
            duration_seconds: None,
        }
    }

    /// Attach a duration.
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    /// File extension matching the MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/wav" | "audio/x-wav" => "wav",
            "audio/ogg" => "ogg",
            "video/mp4" => "mp4",
            "video/webm" => "webm",
            "application/x-subrip" | "text/srt" => "srt",
            _ => "bin",
        }
    }
}
