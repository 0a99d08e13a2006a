//! Trait definitions for the Reelsmith pipeline.
//!
//! One capability trait per provider function (text, image, speech, video),
//! the media assembler used for final videos, and the repository contract
//! the orchestrator persists through. Backends implement these traits; the
//! orchestrator only ever holds `Arc<dyn Trait>` values.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assembler;
mod repository;
mod traits;
mod types;

pub use assembler::{ClipInput, MediaAssembler};
pub use repository::{ArtifactFilter, NarrationBatch, PipelineRepository};
pub use traits::{ImageGenerator, SpeechSynthesizer, TextGenerator, VideoGenerator};
pub use types::{
    GeneratedMedia, ImageRequest, SpeechOutput, SpeechRequest, TextRequest, TextResponse,
    TokenUsage, VideoRequest,
};
pub use tokio_util::sync::CancellationToken;
