//! Integration tests for the Firebase identity provider.
//!
//! The Identity Toolkit and Secure Token endpoints are served by wiremock.

use paperlib_core::api::firebase::{FirebaseAuth, FirebaseSession};
use paperlib_core::api::{IdentityProvider, SessionUser};
use paperlib_core::config::FirebaseConfig;
use paperlib_core::error::PaperlibError;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn auth(mock_server: &MockServer) -> FirebaseAuth {
    FirebaseAuth::new(&FirebaseConfig::new("test-key"))
        .unwrap()
        .with_endpoints(
            format!("{}/v1", mock_server.uri()),
            format!("{}/st/v1", mock_server.uri()),
        )
}

fn password_response(expires_in: &str) -> serde_json::Value {
    json!({
        "kind": "identitytoolkit#VerifyPasswordResponse",
        "localId": "uid-123",
        "email": "ada@example.org",
        "idToken": "id-token-1",
        "refreshToken": "refresh-1",
        "expiresIn": expires_in,
        "registered": true
    })
}

#[tokio::test]
async fn test_sign_in_starts_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .and(query_param("key", "test-key"))
        .and(body_json(json!({
            "email": "ada@example.org",
            "password": "hunter22",
            "returnSecureToken": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(password_response("3600")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = FirebaseSession::new(auth(&mock_server));
    assert!(session.current_user().is_none());

    let user = session.sign_in("ada@example.org", "hunter22").await.unwrap();
    assert_eq!(user.uid(), "uid-123");
    assert_eq!(user.email(), Some("ada@example.org"));

    let current = session.current_user().expect("session should be active");
    assert_eq!(current.id_token().await.unwrap(), "id-token-1");

    session.sign_out();
    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn test_wrong_password_is_identity_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "INVALID_LOGIN_CREDENTIALS",
                "errors": [{ "message": "INVALID_LOGIN_CREDENTIALS", "domain": "global", "reason": "invalid" }]
            }
        })))
        .mount(&mock_server)
        .await;

    let session = FirebaseSession::new(auth(&mock_server));
    let err = session.sign_in("ada@example.org", "wrong").await.unwrap_err();

    match err {
        PaperlibError::Identity { code, status_code } => {
            assert_eq!(code, "INVALID_LOGIN_CREDENTIALS");
            assert_eq!(status_code, Some(400));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn test_expiring_token_is_refreshed() {
    let mock_server = MockServer::start().await;

    // 60 seconds is inside the refresh buffer
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(password_response("60")))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/st/v1/token"))
        .and(query_param("key", "test-key"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "expires_in": "3600",
            "token_type": "Bearer",
            "refresh_token": "refresh-2",
            "id_token": "id-token-2",
            "user_id": "uid-123",
            "project_id": "123456"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = FirebaseSession::new(auth(&mock_server));
    let user = session.sign_in("ada@example.org", "hunter22").await.unwrap();

    assert_eq!(user.id_token().await.unwrap(), "id-token-2");
    // fresh token is reused without another refresh
    assert_eq!(user.id_token().await.unwrap(), "id-token-2");
}

#[tokio::test]
async fn test_sign_up_and_verification_email() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(password_response("3600")))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:sendOobCode"))
        .and(body_json(json!({ "requestType": "VERIFY_EMAIL", "idToken": "id-token-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "email": "ada@example.org" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:lookup"))
        .and(body_json(json!({ "idToken": "id-token-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{ "localId": "uid-123", "email": "ada@example.org", "emailVerified": false }]
        })))
        .mount(&mock_server)
        .await;

    let session = FirebaseSession::new(auth(&mock_server));
    let user = session.sign_up("ada@example.org", "hunter22").await.unwrap();

    user.send_email_verification().await.unwrap();
    assert!(!user.email_verified().await.unwrap());
    assert!(session.user().is_some());
}

#[tokio::test]
async fn test_existing_email_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": { "code": 400, "message": "EMAIL_EXISTS" } })),
        )
        .mount(&mock_server)
        .await;

    let session = FirebaseSession::new(auth(&mock_server));
    let err = session.sign_up("ada@example.org", "hunter22").await.unwrap_err();

    assert!(matches!(err, PaperlibError::Identity { .. }));
    assert_eq!(err.user_message(), "Identity provider error: EMAIL_EXISTS");
}
