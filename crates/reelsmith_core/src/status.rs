//! Record lifecycle status.

use serde::{Deserialize, Serialize};

/// Lifecycle status shared by narrations, scenes, shots and artifacts.
///
/// Artifacts move `pending → completed | failed`; videos pass through
/// `processing` while the provider job runs. `completed` and `failed` are
/// terminal.
///
/// # Examples
///
/// ```
/// use reelsmith_core::RecordStatus;
/// use std::str::FromStr;
///
/// assert_eq!(RecordStatus::from_str("processing").unwrap(), RecordStatus::Processing);
/// assert!(RecordStatus::Failed.is_terminal());
/// assert!(!RecordStatus::Pending.is_terminal());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecordStatus {
    /// Created, not yet generated
    #[default]
    Pending,
    /// Provider job in flight
    Processing,
    /// Generated and stored
    Completed,
    /// Generation failed; see the record's error message
    Failed,
}

impl RecordStatus {
    /// Whether no further transitions are allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RecordStatus::Completed | RecordStatus::Failed)
    }
}
