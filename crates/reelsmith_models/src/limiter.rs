//! Per-backend throttling using governor and Tokio Semaphore.
//!
//! - Requests per minute: governor (GCRA)
//! - Requests in flight: `tokio::sync::Semaphore`
//!
//! [`Throttled`] wraps any capability trait object and acquires the
//! throttle around each call.

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use reelsmith_config::ProviderLimits;
use reelsmith_error::ReelsmithResult;
use reelsmith_interface::{
    CancellationToken, GeneratedMedia, ImageGenerator, ImageRequest, SpeechOutput, SpeechRequest,
    SpeechSynthesizer, TextGenerator, TextRequest, TextResponse, VideoGenerator, VideoRequest,
};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::trace;

type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Request-rate and concurrency limits for one backend.
#[derive(Clone, Default)]
pub struct Throttle {
    rpm_limiter: Option<Arc<DirectRateLimiter>>,
    concurrent_semaphore: Option<Arc<Semaphore>>,
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle")
            .field("rpm", &self.rpm_limiter.is_some())
            .field(
                "available_slots",
                &self.concurrent_semaphore.as_ref().map(|s| s.available_permits()),
            )
            .finish()
    }
}

/// Releases the concurrency slot when dropped.
#[derive(Debug)]
pub struct ThrottleGuard {
    _permit: Option<OwnedSemaphorePermit>,
}

impl Throttle {
    /// Build a throttle from configured limits. Zero values mean unlimited.
    pub fn new(limits: ProviderLimits) -> Self {
        let rpm_limiter = limits
            .requests_per_minute
            .and_then(NonZeroU32::new)
            .map(|n| Arc::new(GovernorRateLimiter::direct(Quota::per_minute(n))));
        let concurrent_semaphore = limits
            .max_concurrent
            .filter(|n| *n > 0)
            .map(|n| Arc::new(Semaphore::new(n as usize)));
        Self {
            rpm_limiter,
            concurrent_semaphore,
        }
    }

    /// Wait until both limits allow one more request.
    ///
    /// The rate quota is taken first so a waiting request does not hold a
    /// concurrency slot.
    pub async fn acquire(&self) -> ThrottleGuard {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.until_ready().await;
        }
        let permit = match &self.concurrent_semaphore {
            // The semaphore is never closed.
            Some(semaphore) => semaphore.clone().acquire_owned().await.ok(),
            None => None,
        };
        trace!(slot = permit.is_some(), "Throttle acquired");
        ThrottleGuard { _permit: permit }
    }
}

/// A backend wrapped with a [`Throttle`].
pub struct Throttled<G: ?Sized> {
    inner: Arc<G>,
    throttle: Throttle,
}

impl<G: ?Sized> Throttled<G> {
    /// Wrap `inner` with `throttle`.
    pub fn new(inner: Arc<G>, throttle: Throttle) -> Self {
        Self { inner, throttle }
    }
}

#[async_trait]
impl TextGenerator for Throttled<dyn TextGenerator> {
    async fn generate_text(&self, request: &TextRequest) -> ReelsmithResult<TextResponse> {
        let _guard = self.throttle.acquire().await;
        self.inner.generate_text(request).await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

#[async_trait]
impl ImageGenerator for Throttled<dyn ImageGenerator> {
    async fn generate_image(
        &self,
        request: &ImageRequest,
        cancel: &CancellationToken,
    ) -> ReelsmithResult<GeneratedMedia> {
        let _guard = self.throttle.acquire().await;
        self.inner.generate_image(request, cancel).await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}

#[async_trait]
impl SpeechSynthesizer for Throttled<dyn SpeechSynthesizer> {
    async fn synthesize(&self, request: &SpeechRequest) -> ReelsmithResult<SpeechOutput> {
        let _guard = self.throttle.acquire().await;
        self.inner.synthesize(request).await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}

#[async_trait]
impl VideoGenerator for Throttled<dyn VideoGenerator> {
    async fn generate_video(
        &self,
        request: &VideoRequest,
        cancel: &CancellationToken,
    ) -> ReelsmithResult<GeneratedMedia> {
        let _guard = self.throttle.acquire().await;
        self.inner.generate_video(request, cancel).await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    fn max_duration_secs(&self) -> u32 {
        self.inner.max_duration_secs()
    }
}
