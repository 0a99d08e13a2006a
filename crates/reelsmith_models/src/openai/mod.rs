//! OpenAI-compatible HTTP backends (chat, images, speech).

mod dto;
mod image;
mod speech;
mod text;

pub use image::OpenAiImageGenerator;
pub use speech::OpenAiSpeechSynthesizer;
pub use text::OpenAiTextGenerator;
