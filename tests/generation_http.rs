//! HTTP-level generator behaviour against a mock Ollama endpoint.

use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;
use url::Url;

use pim_assistant::{GenerationError, OllamaGenerator, TextGenerator};

fn generator_for(endpoint: &str, timeout: Duration) -> OllamaGenerator {
    OllamaGenerator::from_parts(Url::parse(endpoint).unwrap(), "mistral:latest", timeout).unwrap()
}

#[tokio::test]
async fn sends_a_non_streaming_request_and_trims_the_answer() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/generate")
                .json_body_partial(r#"{"model": "mistral:latest", "stream": false}"#);
            then.status(200)
                .json_body(json!({ "response": "  PIM centralises product content.  " }));
        })
        .await;

    let generator = generator_for(&server.url("/api/generate"), Duration::from_secs(5));
    let answer = generator.generate("what is PIM?").await.unwrap();

    mock.assert_async().await;
    assert_eq!(answer, "PIM centralises product content.");
}

#[tokio::test]
async fn slow_endpoint_is_reported_as_a_timeout() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/generate");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(json!({ "response": "too late" }));
        })
        .await;

    let generator = generator_for(&server.url("/api/generate"), Duration::from_millis(100));
    let err = generator.generate("anything").await.unwrap_err();

    assert!(matches!(err, GenerationError::Timeout));
    assert!(err.user_message().contains("too long"));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_connectivity_error() {
    // Port 1 is never listening.
    let generator = generator_for("http://127.0.0.1:1/api/generate", Duration::from_secs(2));
    let err = generator.generate("anything").await.unwrap_err();

    assert!(matches!(err, GenerationError::Connectivity(_)));
    assert!(err.user_message().contains("Ollama"));
}

#[tokio::test]
async fn http_error_status_is_a_connectivity_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/generate");
            then.status(500).body("model not loaded");
        })
        .await;

    let generator = generator_for(&server.url("/api/generate"), Duration::from_secs(5));
    let err = generator.generate("anything").await.unwrap_err();

    assert!(matches!(err, GenerationError::Connectivity(_)));
}

#[tokio::test]
async fn timeout_and_connectivity_messages_differ() {
    let timeout = GenerationError::Timeout.user_message();
    let connectivity = GenerationError::Connectivity("refused".to_string()).user_message();
    assert_ne!(timeout, connectivity);
}
