//! Shared test helpers: mock identity/run endpoints and config builders.
#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wxo_bridge::auth::TokenManager;
use wxo_bridge::config::BridgeConfig;
use wxo_bridge::orchestrate::AgentRunner;

pub const API_KEY: &str = "test-api-key";
pub const IDENTITY_PATH: &str = "/identity/token";
pub const RUNS_PATH: &str = "/v1/orchestrate/runs";

pub fn identity_url(server: &MockServer) -> String {
    format!("{}{IDENTITY_PATH}", server.uri())
}

/// Config pointing both endpoints at the mock server.
pub fn config(server: &MockServer) -> BridgeConfig {
    BridgeConfig::new(API_KEY, server.uri())
        .with_identity_url(identity_url(server))
        .with_agents_file(None)
}

pub fn token_manager(server: &MockServer) -> TokenManager {
    TokenManager::new(API_KEY).with_identity_url(identity_url(server))
}

pub fn runner(config: BridgeConfig) -> AgentRunner {
    let tokens = Arc::new(TokenManager::from_config(&config));
    AgentRunner::new(config, tokens).expect("runner")
}

pub fn identity_response(token: &str, expires_in: u64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": token,
        "refresh_token": "not_supported",
        "token_type": "Bearer",
        "expires_in": expires_in
    }))
}

/// Mount an identity endpoint that must be hit exactly `expected` times.
pub async fn mount_identity(server: &MockServer, token: &str, expected: u64) {
    Mock::given(method("POST"))
        .and(path(IDENTITY_PATH))
        .respond_with(identity_response(token, 3600))
        .expect(expected)
        .mount(server)
        .await;
}

/// Join JSON values into an NDJSON body.
pub fn ndjson(lines: &[Value]) -> String {
    lines
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn run_started(run_id: &str, thread_id: &str) -> Value {
    json!({"event": "run.started", "data": {"run_id": run_id, "thread_id": thread_id}})
}

pub fn text_delta(text: &str) -> Value {
    json!({
        "event": "message.delta",
        "data": {"delta": {"content": [{"response_type": "text", "text": text}]}}
    })
}

pub fn ndjson_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson")
}
