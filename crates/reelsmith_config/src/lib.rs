//! Configuration for the Reelsmith pipeline.
//!
//! Configuration is layered, later sources overriding earlier ones:
//! 1. Bundled defaults (`reelsmith.toml` shipped with the library)
//! 2. `~/.config/reelsmith/reelsmith.toml`
//! 3. `./reelsmith.toml`
//! 4. `REELSMITH__*` environment variables (`REELSMITH__PIPELINE__MAX_CONCURRENCY=8`)
//!
//! API keys never live in the files. Each provider names the environment
//! variable holding its key (`api_key_env`), and `.env` is loaded first.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod pipeline;
mod providers;
mod settings;

pub use pipeline::{JobTimingConfig, PipelineConfig, SafetyConfig};
pub use providers::{
    EndpointSettings, ImageBackend, ImageProviderConfig, ProviderLimits, ProvidersConfig,
    SpeechBackend, SpeechProviderConfig, TextBackend, TextProviderConfig, VideoBackend,
    VideoProviderConfig,
};
pub use settings::ReelsmithConfig;
