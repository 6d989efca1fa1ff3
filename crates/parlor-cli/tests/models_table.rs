use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_models_prints_catalog_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "id": "claude-haiku-4-5",
                "name": "Claude 4.5 Haiku",
                "provider": "claude",
                "description": "Fast and compact"
            },
            {
                "id": "gpt-5.2",
                "name": "GPT-5.2",
                "provider": "openai",
                "description": "General purpose"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempdir().unwrap();
    cargo_bin_cmd!("parlor")
        .env("PARLOR_HOME", home.path())
        .args(["--base-url", &server.uri(), "models"])
        .assert()
        .success()
        .stdout(predicate::str::contains("claude-haiku-4-5"))
        .stdout(predicate::str::contains("Claude 4.5 Haiku"))
        .stdout(predicate::str::contains("openai"));
}

#[tokio::test]
async fn test_models_with_empty_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let home = tempdir().unwrap();
    cargo_bin_cmd!("parlor")
        .env("PARLOR_HOME", home.path())
        .args(["--base-url", &server.uri(), "models"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No models available."));
}

#[tokio::test]
async fn test_models_reports_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/models"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let home = tempdir().unwrap();
    cargo_bin_cmd!("parlor")
        .env("PARLOR_HOME", home.path())
        .args(["--base-url", &server.uri(), "models"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("HTTP 500"));
}
