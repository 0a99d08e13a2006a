//! Text safety transforms applied before text leaves or enters the pipeline.
//!
//! Both transforms are immutable values built once from configuration and
//! shared by reference:
//!
//! - [`ContentFilter`] flags forbidden terms, substitutes sensitive ones and
//!   strips high-severity ones, then normalizes whitespace.
//! - [`TtsCleaner`] removes bracketed stage directions so they are not read
//!   aloud.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod content;
mod tts;

pub use content::{ContentFilter, ContentFilterConfig, FilterOutcome, TermReplacement};
pub use tts::{TtsCleaner, TtsCleanerConfig};
