//! Ollama local model backend.

mod client;

pub use client::OllamaTextGenerator;
