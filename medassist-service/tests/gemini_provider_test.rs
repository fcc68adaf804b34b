//! Gemini adapter against a local stand-in for the Generative Language API.

use axum::body::Bytes;
use medassist_service::services::providers::gemini::{GeminiConfig, GeminiProvider};
use medassist_service::services::providers::{
    GenerationRequest, GenerativeProvider, ProviderError,
};
use secrecy::Secret;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn provider(server: &MockServer) -> GeminiProvider {
    GeminiProvider::new(GeminiConfig {
        api_key: Secret::new("test-google-key".to_string()),
        api_base: format!("{}/v1beta", server.uri()),
        model: "gemini-1.5-flash".to_string(),
        timeout: Duration::from_secs(5),
    })
    .expect("client should build")
}

fn candidate(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn generate_posts_to_model_endpoint_with_api_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-google-key"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "Patient has a cough" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("Likely bronchitis")))
        .expect(1)
        .mount(&server)
        .await;

    let text = provider(&server)
        .generate(&GenerationRequest::text("Patient has a cough"))
        .await
        .expect("generation should succeed");

    assert_eq!(text, "Likely bronchitis");
}

#[tokio::test]
async fn image_request_sends_base64_inline_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_partial_json(json!({
            "contents": [{
                "parts": [
                    { "text": "analyze" },
                    { "inline_data": { "mimeType": "image/png", "data": "YWJj" } },
                    { "text": "none" }
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("No fracture")))
        .expect(1)
        .mount(&server)
        .await;

    let request =
        GenerationRequest::image("analyze", "image/png", Bytes::from_static(b"abc"), "none");
    let text = provider(&server).generate(&request).await.unwrap();

    assert_eq!(text, "No fracture");
}

#[tokio::test]
async fn key_never_appears_in_the_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("ok")))
        .mount(&server)
        .await;

    provider(&server)
        .generate(&GenerationRequest::text("hi"))
        .await
        .unwrap();

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].url.as_str().contains("test-google-key"));
}

#[tokio::test]
async fn too_many_requests_is_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED" }
        })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .generate(&GenerationRequest::text("hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::RateLimited(ref m) if m == "Resource has been exhausted"));
}

#[tokio::test]
async fn server_error_is_api_error_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend unavailable"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .generate(&GenerationRequest::text("hi"))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "API error: Gemini API error 500 Internal Server Error: backend unavailable"
    );
}

#[tokio::test]
async fn non_json_success_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .generate(&GenerationRequest::text("hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::InvalidResponse(_)));
}

#[tokio::test]
async fn safety_block_is_content_filtered() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .generate(&GenerationRequest::text("hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::ContentFiltered(_)));
}

#[tokio::test]
async fn unreachable_host_is_network_error() {
    let provider = GeminiProvider::new(GeminiConfig {
        api_key: Secret::new("k".to_string()),
        api_base: "http://127.0.0.1:1/v1beta".to_string(),
        model: "gemini-1.5-flash".to_string(),
        timeout: Duration::from_secs(2),
    })
    .unwrap();

    let err = provider
        .generate(&GenerationRequest::text("hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::NetworkError(_)));
}
