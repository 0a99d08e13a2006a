//! Job client timing configuration.

use std::time::Duration;

/// Retry and polling limits for a [`crate::JobClient`].
///
/// # Examples
///
/// ```
/// use reelsmith_jobs::JobClientConfigBuilder;
/// use std::time::Duration;
///
/// let config = JobClientConfigBuilder::default()
///     .max_wait(Duration::from_secs(300))
///     .build()
///     .unwrap();
/// assert_eq!(*config.submit_attempts(), 3);
/// assert_eq!(*config.max_wait(), Duration::from_secs(300));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_builder::Builder, derive_getters::Getters)]
#[builder(default)]
pub struct JobClientConfig {
    /// Submission attempts; each tries primary then fallback
    submit_attempts: u32,
    /// Fixed pause between submission attempts
    submit_delay: Duration,
    /// Pause between status checks
    poll_interval: Duration,
    /// Wall-clock limit for one job
    max_wait: Duration,
    /// Timeout for any single HTTP request
    request_timeout: Duration,
}

impl Default for JobClientConfig {
    fn default() -> Self {
        Self {
            submit_attempts: 3,
            submit_delay: Duration::from_secs(2),
            poll_interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(30 * 60),
            request_timeout: Duration::from_secs(60),
        }
    }
}
