//! Pointers to stored media payloads.

use serde::{Deserialize, Serialize};

/// Kind of payload a storage backend holds.
///
/// The snake_case name doubles as the storage directory.
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
pub enum MediaType {
    /// Still image for a shot
    Image,
    /// Narration track for a shot
    Audio,
    /// SRT file for a shot
    Subtitle,
    /// Per-shot clip or assembled chapter video
    Video,
}

/// Where a generated payload lives.
///
/// Artifact records keep only this reference; the bytes stay in storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaReference {
    /// Reference id (fresh per store call, even for deduplicated content)
    pub id: String,
    /// SHA-256 of the payload, lowercase hex
    pub content_hash: String,
    /// Backend that wrote the payload
    pub storage_backend: String,
    /// Backend-specific location
    pub storage_path: String,
    /// Payload size
    pub size_bytes: i64,
    /// Payload kind
    pub media_type: MediaType,
    /// MIME type reported by the provider
    pub mime_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_media_type_names() {
        assert_eq!(MediaType::Subtitle.to_string(), "subtitle");
        assert_eq!(MediaType::from_str("video").unwrap(), MediaType::Video);
        assert!(MediaType::from_str("hologram").is_err());
    }
}
