//! End-to-end tests against a mock HTTP scoring service.

use std::process::Output;

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn predict(dir: &TempDir, endpoint: String, extra: &[&str]) -> Output {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("scoredial").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("SCOREDIAL_ENDPOINT")
        .env_remove("SCOREDIAL_TIMEOUT_SECS")
        .env("NO_COLOR", "1")
        .args(["predict", "--no-animate", "--endpoint"])
        .arg(endpoint)
        .args(extra);
    cmd.output().unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn posts_form_and_renders_prediction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/predict"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "age": "20",
            "gender": "Female",
            "internet_Resource_accessibility": "Average"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "prediction": 91.26,
            "suggestions": ["Keep it up"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let endpoint = format!("{}/api/predict", server.uri());
    let output = tokio::task::spawn_blocking(move || {
        predict(&dir, endpoint, &["--field", "age=20", "--field", "gender=Female"])
    })
    .await
    .unwrap();

    output
        .assert()
        .success()
        .stdout(predicate::str::contains(" 91 / 100"))
        .stdout(predicate::str::contains("Performance Level: Excellent"))
        .stdout(predicate::str::contains("Score Breakdown: 91.3%"))
        .stdout(predicate::str::contains("Keep it up"));
}

#[tokio::test(flavor = "multi_thread")]
async fn service_error_payload_is_shown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/predict"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "Missing field: age"
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let endpoint = format!("{}/api/predict", server.uri());
    let output = tokio::task::spawn_blocking(move || predict(&dir, endpoint, &[]))
        .await
        .unwrap();

    output
        .assert()
        .failure()
        .stdout(predicate::str::contains("Prediction Error: Missing field: age"));
}

#[tokio::test(flavor = "multi_thread")]
async fn non_json_response_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/predict"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let endpoint = format!("{}/api/predict", server.uri());
    let output = tokio::task::spawn_blocking(move || predict(&dir, endpoint, &[]))
        .await
        .unwrap();

    output
        .assert()
        .failure()
        .stdout(predicate::str::contains("Prediction Error:"))
        .stdout(predicate::str::contains("invalid response"));
}
