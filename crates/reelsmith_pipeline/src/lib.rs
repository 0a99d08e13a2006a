//! Pipeline orchestration for Reelsmith.
//!
//! The [`Orchestrator`] turns imported text into narration versions, drives
//! the image, speech and video providers per shot, and assembles the final
//! chapter video. Records persist through any [`PipelineRepository`]; this
//! crate ships [`InMemoryPipelineRepository`], which can snapshot to a JSON
//! file, and an ffmpeg-backed [`MediaAssembler`].
//!
//! [`PipelineRepository`]: reelsmith_interface::PipelineRepository
//! [`MediaAssembler`]: reelsmith_interface::MediaAssembler

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assembler;
mod extraction;
mod memory;
mod orchestrator;
mod prompt;

pub use assembler::FfmpegAssembler;
pub use extraction::{extract_json, parse_json};
pub use memory::InMemoryPipelineRepository;
pub use orchestrator::{
    AssetBatch, BatchFailure, BatchOutcome, ChapterStatus, KindSummary, Lineage, Orchestrator,
    OrchestratorBuilder, OrchestratorBuilderError, OrchestratorSettings, StatusCounts,
    TriggerReceipt, build_narration_batch,
};
pub use prompt::{NARRATION_SYSTEM_PROMPT, build_narration_prompt, narration_request};
