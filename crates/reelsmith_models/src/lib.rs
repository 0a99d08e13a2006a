//! Provider backends for the Reelsmith pipeline.
//!
//! Each backend implements one capability trait from `reelsmith_interface`:
//!
//! | Capability | Backends |
//! |------------|----------|
//! | Text | [`OpenAiTextGenerator`], [`OllamaTextGenerator`] |
//! | Image | [`OpenAiImageGenerator`], [`RenderFarmImageGenerator`] |
//! | Speech | [`FrontendSpeechSynthesizer`], [`OpenAiSpeechSynthesizer`] |
//! | Video | [`TaskApiVideoGenerator`], [`RenderFarmVideoGenerator`] |
//!
//! [`ProviderSet::from_config`] picks one backend per capability from
//! configuration. Job-based backends delegate to `reelsmith_jobs`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod frontend_tts;
mod http;
mod jobs;
mod limiter;
mod ollama;
mod openai;
mod provider_set;
mod render_farm;
mod task_api;

pub use frontend_tts::{FrontendSpeechSynthesizer, parse_word_timings};
pub use http::data_url;
pub use jobs::job_client_config;
pub use limiter::{Throttle, ThrottleGuard, Throttled};
pub use ollama::OllamaTextGenerator;
pub use openai::{OpenAiImageGenerator, OpenAiSpeechSynthesizer, OpenAiTextGenerator};
pub use provider_set::ProviderSet;
pub use render_farm::{RenderFarmImageGenerator, RenderFarmVideoGenerator, WorkflowTemplate};
pub use task_api::TaskApiVideoGenerator;
