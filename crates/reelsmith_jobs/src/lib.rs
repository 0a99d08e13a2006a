//! Client for job-based generation providers.
//!
//! Two of the pipeline's providers do not answer a request with the result;
//! they accept a job and expect the caller to poll for it. [`JobClient`]
//! expresses that as an explicit two-phase API:
//!
//! 1. [`JobClient::submit`] posts the job description and returns a
//!    [`JobHandle`]. If the preferred endpoint answers 404/405 the same body
//!    is posted to a fallback endpoint; whole attempts repeat a fixed number
//!    of times with a fixed delay.
//! 2. [`JobClient::await_output`] polls until the job succeeds, fails, the
//!    wall-clock deadline passes, or the caller cancels.
//! 3. [`JobClient::download`] fetches the resolved output.
//!
//! Provider response shapes are described by a [`JobDialect`]. The client
//! holds no per-job state, so many awaits may run concurrently on clones.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod dialect;
mod render_farm;
mod task_api;

pub use client::{JobClient, JobHandle};
pub use config::{JobClientConfig, JobClientConfigBuilder, JobClientConfigBuilderError};
pub use dialect::{JobDialect, JobOutput, JobStatus};
pub use render_farm::{RenderFarmClient, RenderFarmDialect};
pub use task_api::TaskApiDialect;
pub use tokio_util::sync::CancellationToken;
