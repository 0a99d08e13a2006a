//! Tests for configuration loading and layering.

use reelsmith_config::{
    EndpointSettings, ImageBackend, ReelsmithConfig, SpeechBackend, TextBackend, VideoBackend,
};
use std::io::Write;

#[test]
fn test_from_file_overrides_bundled_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[providers.text]
backend = "ollama"
base_url = "http://localhost:11434"
model = "qwen2.5:14b"

[pipeline]
max_concurrency = 8
"#
    )
    .unwrap();

    let config = ReelsmithConfig::from_file(file.path()).unwrap();

    assert_eq!(config.providers.text.backend, TextBackend::Ollama);
    assert_eq!(config.providers.text.model, "qwen2.5:14b");
    assert_eq!(config.pipeline.max_concurrency, 8);
    // Untouched values keep the bundled defaults
    assert_eq!(config.providers.video.backend, VideoBackend::TaskApi);
    assert_eq!(config.providers.video.max_wait_secs, 1800);
    assert_eq!(config.providers.image.max_wait_secs, 300);
    assert_eq!(config.pipeline.subtitle_max_chars, 16);
}

#[test]
fn test_minimal_document_uses_field_defaults() {
    let config = ReelsmithConfig::from_toml_str("").unwrap();
    assert_eq!(config.providers.image.backend, ImageBackend::RenderFarm);
    assert_eq!(config.providers.speech.backend, SpeechBackend::Frontend);
    assert_eq!(config.jobs.poll_interval_secs, 5);
    assert_eq!(config.safety.tts_cleaner.stray_symbols, vec!["*".to_string()]);
    assert!(config.pipeline.snapshot_path.is_none());
}

#[test]
fn test_safety_terms_parse() {
    let config = ReelsmithConfig::from_toml_str(
        r#"
[safety.content_filter]
forbidden_terms = ["gore"]
stripped_terms = ["slur"]

[[safety.content_filter.replacements]]
term = "kill"
replacement = "defeat"
"#,
    )
    .unwrap();

    let filter = &config.safety.content_filter;
    assert_eq!(filter.forbidden_terms, vec!["gore".to_string()]);
    assert_eq!(filter.replacements[0].replacement, "defeat");
}

#[test]
fn test_api_key_resolved_from_named_variable() {
    let var = "REELSMITH_TEST_VIDEO_KEY_7f3a";
    let config = ReelsmithConfig::from_toml_str(&format!(
        "[providers.video]\napi_key_env = \"{var}\"\n"
    ))
    .unwrap();

    assert_eq!(config.providers.video.api_key(), None);
    // SAFETY: the variable name is unique to this test.
    unsafe { std::env::set_var(var, "ark-secret") };
    assert_eq!(config.providers.video.api_key().as_deref(), Some("ark-secret"));
    unsafe { std::env::remove_var(var) };
}

#[test]
fn test_invalid_backend_rejected() {
    let err = ReelsmithConfig::from_toml_str("[providers.video]\nbackend = \"carrier_pigeon\"\n")
        .unwrap_err();
    assert!(err.to_string().contains("Failed to parse configuration"));
}

#[test]
fn test_out_of_range_video_duration_rejected() {
    assert!(ReelsmithConfig::from_toml_str("[pipeline]\ndefault_video_secs = 30\n").is_err());
}
