//! Tests for the job client against a mock provider.

use reelsmith_error::{JobErrorKind, ReelsmithErrorKind};
use reelsmith_jobs::{
    CancellationToken, JobClient, JobClientConfig, JobClientConfigBuilder, JobHandle,
    RenderFarmClient, TaskApiDialect,
};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_config() -> JobClientConfig {
    JobClientConfigBuilder::default()
        .submit_attempts(3u32)
        .submit_delay(Duration::from_millis(10))
        .poll_interval(Duration::from_millis(50))
        .max_wait(Duration::from_millis(300))
        .request_timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

fn job_kind(err: &reelsmith_error::ReelsmithError) -> JobErrorKind {
    match err.kind() {
        ReelsmithErrorKind::Job(e) => e.kind.clone(),
        other => panic!("expected job error, got {other}"),
    }
}

#[tokio::test]
async fn test_submit_workflow_uses_fallback_on_404() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/prompt"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/prompt"))
        .and(body_partial_json(json!({"prompt": {"3": {"class_type": "KSampler"}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"prompt_id": "p-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = RenderFarmClient::new(server.uri(), None, fast_config()).unwrap();
    let handle = client
        .submit_workflow(&json!({"3": {"class_type": "KSampler"}}))
        .await
        .unwrap();

    assert_eq!(handle.job_id(), "p-1");
    assert!(handle.endpoint().ends_with("/api/prompt"));
}

#[tokio::test]
async fn test_submit_uses_fallback_on_405() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/prompt"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/prompt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"prompt_id": "p-2"})))
        .mount(&server)
        .await;

    let client = RenderFarmClient::new(server.uri(), None, fast_config()).unwrap();
    let handle = client.submit_workflow(&json!({})).await.unwrap();
    assert_eq!(handle.job_id(), "p-2");
}

#[tokio::test]
async fn test_both_endpoints_missing_retries_every_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/prompt"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/prompt"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&server)
        .await;

    let client = RenderFarmClient::new(server.uri(), None, fast_config()).unwrap();
    let err = client.submit_workflow(&json!({})).await.unwrap_err();
    assert!(matches!(job_kind(&err), JobErrorKind::EndpointNotFound { .. }));
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/prompt"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/prompt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"prompt_id": "p-3"})))
        .mount(&server)
        .await;

    let client = RenderFarmClient::new(server.uri(), None, fast_config()).unwrap();
    let handle = client.submit_workflow(&json!({})).await.unwrap();
    assert_eq!(handle.job_id(), "p-3");
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/prompt"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid workflow"))
        .expect(1)
        .mount(&server)
        .await;

    let client = RenderFarmClient::new(server.uri(), None, fast_config()).unwrap();
    let err = client.submit_workflow(&json!({})).await.unwrap_err();
    match job_kind(&err) {
        JobErrorKind::Rejected {
            status_code,
            message,
        } => {
            assert_eq!(status_code, 400);
            assert_eq!(message, "invalid workflow");
        }
        other => panic!("unexpected {other}"),
    }
}

#[tokio::test]
async fn test_wait_times_out_after_max_wait() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history/p-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = RenderFarmClient::new(server.uri(), None, fast_config()).unwrap();
    let handle = JobHandle::new("p-9", format!("{}/prompt", server.uri()));
    let started = Instant::now();
    let err = client
        .wait_for_output_filename(&handle, &CancellationToken::new())
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(err.is_timeout());
    assert!(elapsed >= Duration::from_millis(300), "returned early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "waited too long: {elapsed:?}");
}

#[tokio::test]
async fn test_wait_then_download_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history/p-5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/history/p-5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "p-5": {
                "status": {"status_str": "success", "completed": true},
                "outputs": {"9": {"images": [
                    {"filename": "shot_00001_.png", "subfolder": "reel", "type": "output"}
                ]}}
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/view"))
        .and(query_param("filename", "shot_00001_.png"))
        .and(query_param("subfolder", "reel"))
        .and(query_param("type", "output"))
        .and(header("authorization", "Bearer farm-key"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
        .mount(&server)
        .await;

    let client =
        RenderFarmClient::new(server.uri(), Some("farm-key".to_string()), fast_config()).unwrap();
    let handle = JobHandle::new("p-5", format!("{}/prompt", server.uri()));
    let output = client
        .wait_for_output_filename(&handle, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(output.filename.as_deref(), Some("shot_00001_.png"));

    let bytes = client.download(&output).await.unwrap();
    assert_eq!(bytes, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_cancel_stops_polling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history/p-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let config = JobClientConfigBuilder::default()
        .poll_interval(Duration::from_millis(20))
        .max_wait(Duration::from_secs(60))
        .build()
        .unwrap();
    let client = RenderFarmClient::new(server.uri(), None, config).unwrap();
    let handle = JobHandle::new("p-7", server.uri());
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = client
        .wait_for_output_filename(&handle, &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_task_api_run_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contents/generations/tasks"))
        .and(header("authorization", "Bearer ark-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "cgt-1"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contents/generations/tasks/cgt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cgt-1",
            "status": "succeeded",
            "content": {"video_url": format!("{}/files/cgt-1.mp4", server.uri())}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/cgt-1.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp4".to_vec()))
        .mount(&server)
        .await;

    let client = JobClient::new(
        server.uri(),
        Some("ark-key".to_string()),
        Arc::new(TaskApiDialect::new()),
        fast_config(),
    )
    .unwrap();
    let (output, data) = client
        .run(&json!({"model": "video-1"}), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(output.job_id, "cgt-1");
    assert_eq!(data, b"mp4".to_vec());
}

#[tokio::test]
async fn test_task_failure_is_distinct_from_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contents/generations/tasks/cgt-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "failed",
            "error": {"code": "InputImageSensitiveContentDetected", "message": "image rejected"}
        })))
        .mount(&server)
        .await;

    let client = JobClient::new(
        server.uri(),
        None,
        Arc::new(TaskApiDialect::new()),
        fast_config(),
    )
    .unwrap();
    let err = client
        .await_output(&JobHandle::new("cgt-2", server.uri()), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(!err.is_timeout());
    match job_kind(&err) {
        JobErrorKind::Failed { message, .. } => assert_eq!(message, "image rejected"),
        other => panic!("unexpected {other}"),
    }
}

#[tokio::test]
async fn test_completed_without_output_is_missing_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contents/generations/tasks/cgt-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "succeeded"})))
        .mount(&server)
        .await;

    let client = JobClient::new(
        server.uri(),
        None,
        Arc::new(TaskApiDialect::new()),
        fast_config(),
    )
    .unwrap();
    let err = client
        .await_output(&JobHandle::new("cgt-3", server.uri()), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(job_kind(&err), JobErrorKind::MissingOutput { .. }));
}
