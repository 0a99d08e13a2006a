//! Job client settings derived from configuration.

use reelsmith_config::JobTimingConfig;
use reelsmith_error::{ConfigError, ReelsmithResult};
use reelsmith_jobs::{JobClientConfig, JobClientConfigBuilder};
use std::time::Duration;

/// Job client limits for a provider with the given max wait.
pub fn job_client_config(
    timing: &JobTimingConfig,
    max_wait_secs: u64,
) -> ReelsmithResult<JobClientConfig> {
    JobClientConfigBuilder::default()
        .submit_attempts(timing.submit_attempts)
        .submit_delay(timing.submit_delay())
        .poll_interval(timing.poll_interval())
        .request_timeout(timing.request_timeout())
        .max_wait(Duration::from_secs(max_wait_secs))
        .build()
        .map_err(|e| ConfigError::new(format!("Invalid job client settings: {}", e)).into())
}
