mod common;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use futures::future::join_all;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wxo_bridge::auth::{AuthError, Credential};

use common::{identity_response, mount_identity, token_manager, IDENTITY_PATH};

#[tokio::test]
async fn second_call_reuses_cached_token() {
    let server = MockServer::start().await;
    mount_identity(&server, "tok-1", 1).await;

    let tokens = token_manager(&server);
    let first = tokens.get_token().await.expect("first token");
    let second = tokens.get_token().await.expect("second token");

    assert_eq!(first, "tok-1");
    assert_eq!(second, "tok-1");
}

#[tokio::test]
async fn refresh_posts_form_encoded_api_key_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IDENTITY_PATH))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(header("accept", "application/json"))
        .and(body_string_contains(
            "grant_type=urn%3Aibm%3Aparams%3Aoauth%3Agrant-type%3Aapikey",
        ))
        .and(body_string_contains("apikey=test-api-key"))
        .respond_with(identity_response("tok-form", 3600))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = token_manager(&server);
    assert_eq!(tokens.get_token().await.unwrap(), "tok-form");
}

#[tokio::test]
async fn missing_expires_in_defaults_to_one_hour() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IDENTITY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok-default"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = token_manager(&server);
    let before = Utc::now();
    let credential = tokens.get_credential().await.unwrap();

    let expected = before + Duration::seconds(3600 - 300);
    let drift = (credential.expires_at() - expected).num_seconds().abs();
    assert!(drift <= 5, "expiry drifted by {drift}s");
}

#[tokio::test]
async fn lifetime_inside_safety_margin_refreshes_every_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IDENTITY_PATH))
        .respond_with(identity_response("short-lived", 300))
        .expect(2)
        .mount(&server)
        .await;

    let tokens = token_manager(&server);
    tokens.get_token().await.unwrap();
    tokens.get_token().await.unwrap();
}

#[tokio::test]
async fn expired_credential_triggers_refresh() {
    let server = MockServer::start().await;
    mount_identity(&server, "tok-new", 1).await;

    let tokens = token_manager(&server)
        .with_credential(Credential::new("tok-old", Utc::now() - Duration::seconds(1)));

    assert_eq!(tokens.get_token().await.unwrap(), "tok-new");
}

#[tokio::test]
async fn credential_before_expiry_is_not_refreshed() {
    let server = MockServer::start().await;
    mount_identity(&server, "tok-new", 0).await;

    let tokens = token_manager(&server)
        .with_credential(Credential::new("tok-old", Utc::now() + Duration::seconds(30)));

    assert_eq!(tokens.get_token().await.unwrap(), "tok-old");
}

#[tokio::test]
async fn concurrent_callers_share_one_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IDENTITY_PATH))
        .respond_with(identity_response("tok-shared", 3600).set_delay(StdDuration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = Arc::new(token_manager(&server));
    let calls = (0..16).map(|_| {
        let tokens = Arc::clone(&tokens);
        tokio::spawn(async move { tokens.get_token().await })
    });

    let results = join_all(calls).await;
    for result in results {
        let token = result.expect("task panicked").expect("token");
        assert_eq!(token, "tok-shared");
    }
}

#[tokio::test]
async fn rejection_keeps_credential_and_next_call_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IDENTITY_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("{\"errorCode\":\"BXNIM0415E\"}"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_identity(&server, "tok-recovered", 1).await;

    let stale = Credential::new("tok-stale", Utc::now() - Duration::minutes(1));
    let tokens = token_manager(&server).with_credential(stale.clone());

    let err = tokens.get_token().await.unwrap_err();
    match err {
        AuthError::Rejected { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "{\"errorCode\":\"BXNIM0415E\"}");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert_eq!(tokens.credential(), Some(stale));

    assert_eq!(tokens.get_token().await.unwrap(), "tok-recovered");
}

#[tokio::test]
async fn undecodable_identity_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IDENTITY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = token_manager(&server);
    let err = tokens.get_token().await.unwrap_err();

    assert!(matches!(err, AuthError::InvalidResponse(_)));
    assert!(tokens.credential().is_none());
}

#[tokio::test]
async fn invalidate_forces_refresh() {
    let server = MockServer::start().await;
    mount_identity(&server, "tok-again", 2).await;

    let tokens = token_manager(&server);
    tokens.get_token().await.unwrap();
    tokens.invalidate();
    tokens.get_token().await.unwrap();
}

#[tokio::test]
async fn unreachable_identity_endpoint_is_network_error() {
    let tokens = wxo_bridge::auth::TokenManager::new("key")
        .with_identity_url("http://127.0.0.1:1/identity/token");

    let err = tokens.get_token().await.unwrap_err();
    assert!(matches!(err, AuthError::Network(_)));
}

#[tokio::test]
async fn stalled_identity_endpoint_times_out_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IDENTITY_PATH))
        .respond_with(identity_response("tok-late", 3600).set_delay(StdDuration::from_secs(5)))
        .mount(&server)
        .await;

    let tokens = token_manager(&server).with_request_timeout(StdDuration::from_millis(100));
    let started = std::time::Instant::now();
    let err = tokens.get_token().await.unwrap_err();

    assert!(started.elapsed() < StdDuration::from_secs(2));
    assert!(matches!(err, AuthError::Network(_)), "{err:?}");
    assert!(tokens.credential().is_none());
}
