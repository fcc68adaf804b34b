mod common;

use common::{test_config, TestApp};
use medassist_service::services::providers::mock::{
    MockGenerativeProvider, MockPrescriptionProvider,
};
use reqwest::StatusCode;

const CHATTY_DIAGNOSIS: &str = "**Diagnosis:** *Viral upper respiratory infection*\n\n\
**Disclaimer:** I am an AI and cannot provide medical advice.\n\
**Treatment:** Rest and fluids.";

async fn spawn_with_response(response: &str) -> TestApp {
    TestApp::spawn_with(
        test_config(),
        MockGenerativeProvider::new(response),
        MockPrescriptionProvider::new("unused"),
    )
    .await
}

#[tokio::test]
async fn diagnose_echoes_fields_and_returns_clean_diagnosis() {
    let app = spawn_with_response(CHATTY_DIAGNOSIS).await;

    let response = app
        .client
        .get(app.url("/diagnose"))
        .query(&[
            ("name", "Jane"),
            ("age", "34"),
            ("gender", "F"),
            ("symptoms", "fever, cough"),
            ("medicalHistory", ""),
        ])
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["name"], "Jane");
    assert_eq!(body["age"], "34");
    assert_eq!(body["gender"], "F");
    assert_eq!(body["symptoms"], "fever, cough");
    assert_eq!(body["medicalHistory"], "");

    let diagnosis = body["diagnosis"].as_str().expect("diagnosis is a string");
    assert!(!diagnosis.is_empty());
    assert!(!diagnosis.contains('*'));
    assert!(!diagnosis.to_lowercase().contains("disclaimer:"));
    assert!(!diagnosis.contains("I am an AI and"));
    assert!(diagnosis.starts_with("Diagnosis: Viral upper respiratory infection"));

    app.cleanup().await;
}

#[tokio::test]
async fn diagnose_sends_patient_details_to_provider() {
    let app = spawn_with_response("ok").await;

    app.client
        .get(app.url("/diagnose"))
        .query(&[
            ("name", "  Jane "),
            ("age", "34"),
            ("gender", "F"),
            ("symptoms", "fever"),
        ])
        .send()
        .await
        .expect("Failed to execute request.");

    let request = app
        .generative
        .last_request()
        .expect("provider should have been called");
    assert_eq!(request.image_count(), 0);

    let prompt = request.texts().next().expect("one text part");
    assert!(prompt.contains("**Patient Name:** Jane\n"));
    assert!(prompt.contains("**Past Medical History:** None"));

    app.cleanup().await;
}

#[tokio::test]
async fn diagnose_without_symptoms_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/diagnose"))
        .query(&[("name", "Jane"), ("age", "34"), ("gender", "F")])
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(
        body,
        serde_json::json!({ "error": "Missing required parameters" })
    );
    assert!(app.generative.last_request().is_none());

    app.cleanup().await;
}

#[tokio::test]
async fn whitespace_only_parameter_counts_as_missing() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/diagnose"))
        .query(&[
            ("name", "   "),
            ("age", "34"),
            ("gender", "F"),
            ("symptoms", "fever"),
        ])
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    app.cleanup().await;
}

#[tokio::test]
async fn provider_failure_is_500_with_message() {
    let app = TestApp::spawn_with(
        test_config(),
        MockGenerativeProvider::failing("quota exceeded"),
        MockPrescriptionProvider::new("unused"),
    )
    .await;

    let response = app
        .client
        .get(app.url("/diagnose"))
        .query(&[
            ("name", "Jane"),
            ("age", "34"),
            ("gender", "F"),
            ("symptoms", "fever"),
        ])
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "API error: quota exceeded");

    app.cleanup().await;
}

#[tokio::test]
async fn plain_options_request_gets_confirmation() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .request(reqwest::Method::OPTIONS, app.url("/diagnose"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["message"], "CORS Preflight Passed");
    assert!(app.generative.last_request().is_none());

    app.cleanup().await;
}

#[tokio::test]
async fn repeated_query_parameter_is_a_json_400() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/diagnose?name=a&name=b&age=1&gender=F&symptoms=x"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()["content-type"],
        "application/json"
    );
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(
        body,
        serde_json::json!({ "error": "Missing required parameters" })
    );
    assert!(app.generative.last_request().is_none());

    app.cleanup().await;
}

#[tokio::test]
async fn unsupported_method_on_diagnose_keeps_cors_header() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/diagnose"))
        .header("Origin", "https://frontend.example")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");

    app.cleanup().await;
}
