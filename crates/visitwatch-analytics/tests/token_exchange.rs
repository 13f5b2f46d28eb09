//! Integration tests for the service-account token exchange.
//!
//! Each test writes a throwaway key file whose `token_uri` points at a local
//! wiremock server, so no real Google endpoint is contacted.

use std::path::PathBuf;

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use visitwatch_analytics::{load_access_token, CredentialError, ANALYTICS_READONLY_SCOPE};

const PRIVATE_KEY: &str = include_str!("fixtures/test_key.pem");

/// Writes a service-account key file into the temp dir and returns its path.
fn write_key_file(token_uri: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("visitwatch-key-{}.json", uuid::Uuid::new_v4()));
    let body = json!({
        "type": "service_account",
        "project_id": "visitwatch-test",
        "private_key_id": "kid-123",
        "private_key": PRIVATE_KEY,
        "client_email": "watcher@visitwatch-test.iam.gserviceaccount.com",
        "token_uri": token_uri
    });
    std::fs::write(&path, body.to_string()).expect("failed to write key fixture");
    path
}

#[tokio::test]
async fn load_access_token_exchanges_signed_assertion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.test-access-token",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let key_path = write_key_file(&format!("{}/token", server.uri()));
    let token = load_access_token(&key_path, ANALYTICS_READONLY_SCOPE, 5)
        .await
        .expect("token exchange should succeed");
    let _ = std::fs::remove_file(&key_path);

    assert_eq!(token.secret(), "ya29.test-access-token");
    assert!(token.expires_at() > chrono::Utc::now());
}

#[tokio::test]
async fn load_access_token_reports_rejected_scope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_scope",
            "error_description": "Invalid OAuth scope or ID token audience provided."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let key_path = write_key_file(&format!("{}/token", server.uri()));
    let err = load_access_token(&key_path, ANALYTICS_READONLY_SCOPE, 5)
        .await
        .unwrap_err();
    let _ = std::fs::remove_file(&key_path);

    match err {
        CredentialError::TokenRejected { status, message } => {
            assert_eq!(status, 400);
            assert!(message.starts_with("invalid_scope"), "message: {message}");
        }
        other => panic!("expected TokenRejected, got: {other:?}"),
    }
}

#[tokio::test]
async fn load_access_token_fails_for_missing_file() {
    let missing = std::env::temp_dir().join(format!("visitwatch-missing-{}.json", uuid::Uuid::new_v4()));
    let err = load_access_token(&missing, ANALYTICS_READONLY_SCOPE, 5)
        .await
        .unwrap_err();
    assert!(
        matches!(err, CredentialError::Io { ref path, .. } if path == &missing),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn load_access_token_fails_for_malformed_file() {
    let path = std::env::temp_dir().join(format!("visitwatch-bad-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, "{\"type\": \"service_account\"").unwrap();
    let err = load_access_token(&path, ANALYTICS_READONLY_SCOPE, 5)
        .await
        .unwrap_err();
    let _ = std::fs::remove_file(&path);
    assert!(matches!(err, CredentialError::Parse(_)), "got: {err:?}");
}
