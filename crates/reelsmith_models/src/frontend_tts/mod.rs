//! Envelope-style TTS API returning audio plus frontend word timings.

mod client;
mod frontend;

pub use client::FrontendSpeechSynthesizer;
pub use frontend::parse_word_timings;
