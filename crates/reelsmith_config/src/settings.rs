//! Top-level configuration and loading.

use crate::{JobTimingConfig, PipelineConfig, ProvidersConfig, SafetyConfig};
use config::{Config, Environment, File, FileFormat};
use reelsmith_error::{ConfigError, ReelsmithError, ReelsmithResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../reelsmith.toml");

/// Top-level Reelsmith configuration.
///
/// # Example
///
/// ```no_run
/// use reelsmith_config::ReelsmithConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ReelsmithConfig::load()?;
/// println!("Fan-out: {}", config.pipeline.max_concurrency);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ReelsmithConfig {
    /// Provider backends
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Job polling cadence
    #[serde(default)]
    pub jobs: JobTimingConfig,
    /// Orchestration settings
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Text safety settings
    #[serde(default)]
    pub safety: SafetyConfig,
}

impl ReelsmithConfig {
    /// Load configuration with precedence: env > current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> ReelsmithResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled");

        // .env is optional; it only feeds api_key_env lookups and overrides.
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env");
        }

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/reelsmith/reelsmith.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("reelsmith").required(false))
            .add_source(
                Environment::with_prefix("REELSMITH")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder
            .build()
            .map_err(|e| {
                ReelsmithError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ReelsmithError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file, on top of the bundled defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> ReelsmithResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ReelsmithError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ReelsmithError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document on its own (no defaults merged, missing fields defaulted).
    pub fn from_toml_str(content: &str) -> ReelsmithResult<Self> {
        let config: Self = Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .and_then(Config::try_deserialize::<Self>)
            .map_err(|e| {
                ReelsmithError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall or break the pipeline.
    pub fn validate(&self) -> ReelsmithResult<()> {
        if self.pipeline.max_concurrency == 0 {
            return Err(ConfigError::new("pipeline.max_concurrency must be at least 1").into());
        }
        if self.pipeline.subtitle_max_chars == 0 {
            return Err(ConfigError::new("pipeline.subtitle_max_chars must be at least 1").into());
        }
        if self.pipeline.speed_ratio <= 0.0 {
            return Err(ConfigError::new("pipeline.speed_ratio must be positive").into());
        }
        if self.jobs.submit_attempts == 0 {
            return Err(ConfigError::new("jobs.submit_attempts must be at least 1").into());
        }
        if self.jobs.poll_interval_secs == 0 {
            return Err(ConfigError::new("jobs.poll_interval_secs must be at least 1").into());
        }
        if !(1..=12).contains(&self.pipeline.default_video_secs) {
            return Err(
                ConfigError::new("pipeline.default_video_secs must be between 1 and 12").into(),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_defaults_parse() {
        let config = ReelsmithConfig::from_toml_str(DEFAULT_CONFIG).unwrap();
        assert!(config.pipeline.max_concurrency >= 1);
        assert_eq!(config.jobs.submit_attempts, 3);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = ReelsmithConfig::from_toml_str("[pipeline]\nmax_concurrency = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_concurrency"));
    }
}
