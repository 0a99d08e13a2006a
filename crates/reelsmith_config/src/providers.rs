//! Provider selection and connection settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Optional per-backend throttling.
///
/// ```toml
/// [providers.video.limits]
/// requests_per_minute = 10
/// max_concurrent = 2
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProviderLimits {
    /// Requests per minute (unlimited when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_per_minute: Option<u32>,

    /// Requests in flight at once (unlimited when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<u32>,
}

impl ProviderLimits {
    /// True when no limit is configured.
    pub fn is_unlimited(&self) -> bool {
        self.requests_per_minute.is_none() && self.max_concurrent.is_none()
    }
}

/// Connection settings shared by every provider section.
pub trait EndpointSettings {
    /// Base URL of the provider API.
    fn base_url(&self) -> &str;

    /// Name of the environment variable holding the API key.
    fn api_key_env(&self) -> Option<&str>;

    /// Throttling for this backend.
    fn limits(&self) -> ProviderLimits;

    /// Resolve the API key from the environment.
    ///
    /// Returns `None` when no variable is configured or it is unset or empty.
    fn api_key(&self) -> Option<String> {
        let var = self.api_key_env()?;
        std::env::var(var).ok().filter(|key| !key.trim().is_empty())
    }
}

macro_rules! endpoint_settings {
    ($ty:ty) => {
        impl EndpointSettings for $ty {
            fn base_url(&self) -> &str {
                &self.base_url
            }

            fn api_key_env(&self) -> Option<&str> {
                self.api_key_env.as_deref()
            }

            fn limits(&self) -> ProviderLimits {
                self.limits
            }
        }
    };
}

/// Text generation backends.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TextBackend {
    /// OpenAI-compatible `/chat/completions`
    #[default]
    #[serde(rename = "openai")]
    #[strum(serialize = "openai")]
    OpenAi,
    /// Ollama `/api/generate`
    Ollama,
}

/// Image generation backends.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ImageBackend {
    /// OpenAI-compatible `/images/generations`
    #[serde(rename = "openai")]
    #[strum(serialize = "openai")]
    OpenAi,
    /// Job-based render farm workflow
    #[default]
    RenderFarm,
}

/// Speech synthesis backends.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SpeechBackend {
    /// Envelope API returning audio plus frontend word timings
    #[default]
    Frontend,
    /// OpenAI-compatible `/audio/speech` (timings estimated)
    #[serde(rename = "openai")]
    #[strum(serialize = "openai")]
    OpenAi,
}

/// Video generation backends.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VideoBackend {
    /// Vendor task API
    #[default]
    TaskApi,
    /// Render farm image-to-video workflow
    RenderFarm,
}

fn default_text_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_text_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

/// `[providers.text]`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TextProviderConfig {
    /// Backend to use
    #[serde(default)]
    pub backend: TextBackend,
    /// API base URL
    #[serde(default = "default_text_url")]
    pub base_url: String,
    /// Environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Model name
    #[serde(default = "default_text_model")]
    pub model: String,
    /// Completion token cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Throttling
    #[serde(default)]
    pub limits: ProviderLimits,
}

impl Default for TextProviderConfig {
    fn default() -> Self {
        Self {
            backend: TextBackend::default(),
            base_url: default_text_url(),
            api_key_env: None,
            model: default_text_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            limits: ProviderLimits::default(),
        }
    }
}

endpoint_settings!(TextProviderConfig);

fn default_render_farm_url() -> String {
    "http://127.0.0.1:8188".to_string()
}

fn default_image_size() -> String {
    "1024x1792".to_string()
}

fn default_image_wait() -> u64 {
    300
}

/// `[providers.image]`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ImageProviderConfig {
    /// Backend to use
    #[serde(default)]
    pub backend: ImageBackend,
    /// API base URL
    #[serde(default = "default_render_farm_url")]
    pub base_url: String,
    /// Environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Model name (OpenAI backend)
    #[serde(default)]
    pub model: Option<String>,
    /// Requested image size (OpenAI backend)
    #[serde(default = "default_image_size")]
    pub size: String,
    /// Workflow template with `{{prompt}}` and `{{filename_prefix}}` placeholders
    /// (render farm backend; a built-in text-to-image graph when absent)
    #[serde(default)]
    pub workflow_path: Option<PathBuf>,
    /// Longest wait for a job, in seconds
    #[serde(default = "default_image_wait")]
    pub max_wait_secs: u64,
    /// Throttling
    #[serde(default)]
    pub limits: ProviderLimits,
}

impl Default for ImageProviderConfig {
    fn default() -> Self {
        Self {
            backend: ImageBackend::default(),
            base_url: default_render_farm_url(),
            api_key_env: None,
            model: None,
            size: default_image_size(),
            workflow_path: None,
            max_wait_secs: default_image_wait(),
            limits: ProviderLimits::default(),
        }
    }
}

endpoint_settings!(ImageProviderConfig);

fn default_speech_url() -> String {
    "https://openspeech.bytedance.com/api/v1/tts".to_string()
}

fn default_cluster() -> String {
    "volcano_tts".to_string()
}

fn default_voice() -> String {
    "zh_male_M392_conversation_wvae_bigtts".to_string()
}

fn default_encoding() -> String {
    "mp3".to_string()
}

fn default_sample_rate() -> u32 {
    24000
}

fn default_uid() -> String {
    "reelsmith".to_string()
}

fn default_chars_per_second() -> f64 {
    4.5
}

/// `[providers.speech]`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SpeechProviderConfig {
    /// Backend to use
    #[serde(default)]
    pub backend: SpeechBackend,
    /// Synthesis endpoint (full URL for the frontend backend, API base for OpenAI)
    #[serde(default = "default_speech_url")]
    pub base_url: String,
    /// Environment variable holding the access token
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Application id (frontend backend)
    #[serde(default)]
    pub app_id: Option<String>,
    /// Cluster name (frontend backend)
    #[serde(default = "default_cluster")]
    pub cluster: String,
    /// Voice name
    #[serde(default = "default_voice")]
    pub voice: String,
    /// Audio encoding
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// Sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// User id sent with each request (frontend backend)
    #[serde(default = "default_uid")]
    pub uid: String,
    /// Model name (OpenAI backend)
    #[serde(default)]
    pub model: Option<String>,
    /// Speaking rate used to estimate timings when the backend returns none
    #[serde(default = "default_chars_per_second")]
    pub chars_per_second: f64,
    /// Throttling
    #[serde(default)]
    pub limits: ProviderLimits,
}

impl Default for SpeechProviderConfig {
    fn default() -> Self {
        Self {
            backend: SpeechBackend::default(),
            base_url: default_speech_url(),
            api_key_env: None,
            app_id: None,
            cluster: default_cluster(),
            voice: default_voice(),
            encoding: default_encoding(),
            sample_rate: default_sample_rate(),
            uid: default_uid(),
            model: None,
            chars_per_second: default_chars_per_second(),
            limits: ProviderLimits::default(),
        }
    }
}

endpoint_settings!(SpeechProviderConfig);

fn default_video_url() -> String {
    "https://ark.cn-beijing.volces.com/api/v3".to_string()
}

fn default_video_model() -> String {
    "doubao-seedance-1-0-lite-i2v-250428".to_string()
}

fn default_ratio() -> String {
    "9:16".to_string()
}

fn default_video_wait() -> u64 {
    1800
}

/// `[providers.video]`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VideoProviderConfig {
    /// Backend to use
    #[serde(default)]
    pub backend: VideoBackend,
    /// API base URL
    #[serde(default = "default_video_url")]
    pub base_url: String,
    /// Environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Model name (task API backend)
    #[serde(default = "default_video_model")]
    pub model: String,
    /// Aspect ratio
    #[serde(default = "default_ratio")]
    pub ratio: String,
    /// Ask the provider to watermark output
    #[serde(default)]
    pub watermark: bool,
    /// Image-to-video workflow template (render farm backend)
    #[serde(default)]
    pub workflow_path: Option<PathBuf>,
    /// Submit path tried when the task endpoint answers 404/405 (task API backend)
    #[serde(default)]
    pub fallback_path: Option<String>,
    /// Longest wait for a job, in seconds
    #[serde(default = "default_video_wait")]
    pub max_wait_secs: u64,
    /// Throttling
    #[serde(default)]
    pub limits: ProviderLimits,
}

impl Default for VideoProviderConfig {
    fn default() -> Self {
        Self {
            backend: VideoBackend::default(),
            base_url: default_video_url(),
            api_key_env: None,
            model: default_video_model(),
            ratio: default_ratio(),
            watermark: false,
            workflow_path: None,
            fallback_path: None,
            max_wait_secs: default_video_wait(),
            limits: ProviderLimits::default(),
        }
    }
}

endpoint_settings!(VideoProviderConfig);

/// `[providers]`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ProvidersConfig {
    /// Text generation
    #[serde(default)]
    pub text: TextProviderConfig,
    /// Image generation
    #[serde(default)]
    pub image: ImageProviderConfig,
    /// Speech synthesis
    #[serde(default)]
    pub speech: SpeechProviderConfig,
    /// Video generation
    #[serde(default)]
    pub video: VideoProviderConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_backend_names() {
        assert_eq!(TextBackend::OpenAi.to_string(), "openai");
        assert_eq!(ImageBackend::from_str("render_farm").unwrap(), ImageBackend::RenderFarm);
        assert_eq!(VideoBackend::TaskApi.to_string(), "task_api");
        assert!(SpeechBackend::from_str("bogus").is_err());
    }

    #[test]
    fn test_api_key_requires_env_name() {
        let config = TextProviderConfig::default();
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn test_limits_default_unlimited() {
        assert!(ProviderLimits::default().is_unlimited());
        let limits = ProviderLimits {
            requests_per_minute: Some(10),
            max_concurrent: None,
        };
        assert!(!limits.is_unlimited());
    }
}
