//! Orchestration, job timing and safety settings.

use reelsmith_safety::{ContentFilterConfig, TtsCleanerConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

fn default_submit_attempts() -> u32 {
    3
}

fn default_submit_delay() -> u64 {
    2
}

fn default_poll_interval() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    60
}

/// `[jobs]`: submit retry and polling cadence for job-based providers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct JobTimingConfig {
    /// Whole submit attempts (primary and fallback each time)
    #[serde(default = "default_submit_attempts")]
    pub submit_attempts: u32,
    /// Seconds between submit attempts
    #[serde(default = "default_submit_delay")]
    pub submit_delay_secs: u64,
    /// Seconds between status polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for JobTimingConfig {
    fn default() -> Self {
        Self {
            submit_attempts: default_submit_attempts(),
            submit_delay_secs: default_submit_delay(),
            poll_interval_secs: default_poll_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl JobTimingConfig {
    /// Delay between submit attempts.
    pub fn submit_delay(&self) -> Duration {
        Duration::from_secs(self.submit_delay_secs)
    }

    /// Interval between polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// HTTP request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_max_concurrency() -> usize {
    4
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("reelsmith-media")
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_speed_ratio() -> f32 {
    1.0
}

fn default_subtitle_chars() -> usize {
    16
}

fn default_true() -> bool {
    true
}

fn default_video_seconds() -> u32 {
    5
}

/// `[pipeline]`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Generation tasks in flight per operation
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Root of content-addressed media storage
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
    /// Repository snapshot file (in-memory only when absent)
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
    /// ffmpeg executable
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_path: PathBuf,
    /// Speech speed multiplier
    #[serde(default = "default_speed_ratio")]
    pub speed_ratio: f32,
    /// Longest subtitle cue in characters
    #[serde(default = "default_subtitle_chars")]
    pub subtitle_max_chars: usize,
    /// Drop punctuation from subtitle cues
    #[serde(default = "default_true")]
    pub subtitle_strip_punctuation: bool,
    /// Clip length when a shot has neither audio nor a duration hint
    #[serde(default = "default_video_seconds")]
    pub default_video_secs: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            storage_dir: default_storage_dir(),
            snapshot_path: None,
            ffmpeg_path: default_ffmpeg(),
            speed_ratio: default_speed_ratio(),
            subtitle_max_chars: default_subtitle_chars(),
            subtitle_strip_punctuation: true,
            default_video_secs: default_video_seconds(),
        }
    }
}

/// `[safety]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SafetyConfig {
    /// Narration content filter
    #[serde(default)]
    pub content_filter: ContentFilterConfig,
    /// Speech text cleaner
    #[serde(default)]
    pub tts_cleaner: TtsCleanerConfig,
}
