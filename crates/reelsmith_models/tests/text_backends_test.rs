//! Tests for the text generation backends.

use reelsmith_error::{ProviderErrorKind, ReelsmithErrorKind};
use reelsmith_interface::{TextGenerator, TextRequest};
use reelsmith_models::{OllamaTextGenerator, OpenAiTextGenerator};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_openai_chat_completion() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "system", "content": "You write scripts."},
                {"role": "user", "content": "Chapter one."}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"scenes\": []}"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let generator =
        OpenAiTextGenerator::new(server.uri(), Some("sk-test".to_string()), "gpt-4o-mini")?;
    let mut request = TextRequest::new("Chapter one.");
    request.system = Some("You write scripts.".to_string());
    let response = generator.generate_text(&request).await?;

    assert_eq!(response.text, "{\"scenes\": []}");
    assert_eq!(response.usage.map(|u| u.total_tokens), Some(17));
    assert_eq!(generator.provider_name(), "openai");
    Ok(())
}

#[tokio::test]
async fn test_openai_error_status_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let generator = OpenAiTextGenerator::new(server.uri(), None, "m").unwrap();
    let err = generator
        .generate_text(&TextRequest::new("hi"))
        .await
        .unwrap_err();
    match err.kind() {
        ReelsmithErrorKind::Provider(e) => {
            assert!(matches!(
                e.kind,
                ProviderErrorKind::Api {
                    status_code: 429,
                    ..
                }
            ));
            assert!(e.kind.is_retryable());
        }
        other => panic!("unexpected {other}"),
    }
}

#[tokio::test]
async fn test_openai_empty_choices_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let generator = OpenAiTextGenerator::new(server.uri(), None, "m").unwrap();
    let err = generator
        .generate_text(&TextRequest::new("hi"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no content"));
}

#[tokio::test]
async fn test_ollama_generate() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({"model": "qwen2.5", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "hello there",
            "done": true,
            "prompt_eval_count": 4,
            "eval_count": 2
        })))
        .mount(&server)
        .await;

    let generator = OllamaTextGenerator::new(server.uri(), "qwen2.5")?;
    let response = generator.generate_text(&TextRequest::new("hi")).await?;
    assert_eq!(response.text, "hello there");
    assert_eq!(response.usage.map(|u| u.total_tokens), Some(6));
    Ok(())
}
