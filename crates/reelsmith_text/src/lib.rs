//! Pure text transforms used by the Reelsmith pipeline.
//!
//! Nothing here performs I/O: chapter splitting, the word→character timing
//! builder and subtitle cue construction are deterministic functions of
//! their input.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod alignment;
mod split;
mod subtitle;

pub use alignment::{build_char_timings, estimate_word_timings};
pub use split::split_chapters;
pub use subtitle::{SubtitleCue, SubtitleOptions, build_subtitle_cues, format_srt_time, render_srt};
