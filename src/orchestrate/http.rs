//! HTTP client, header and URL helpers for the orchestration API.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};

use crate::error::ProxyError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const API_KEY_HEADER: HeaderName = HeaderName::from_static("iam-api_key");

/// Query string the run endpoint needs to stream NDJSON back.
pub const RUN_QUERY: &str = "stream=true&stream_timeout=120000&multiple_content=true";

/// Build a reqwest client for the orchestration instance.
pub fn build_client() -> Result<reqwest::Client, ProxyError> {
    Ok(reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(10)
        .build()?)
}

/// Headers for an authenticated orchestration call.
pub fn orchestrate_headers(token: &str, api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {token}")) {
        headers.insert(AUTHORIZATION, val);
    }
    if let Ok(mut val) = HeaderValue::from_str(api_key) {
        val.set_sensitive(true);
        headers.insert(API_KEY_HEADER, val);
    }
    headers
}

pub fn runs_url(instance_url: &str) -> String {
    format!("{instance_url}/v1/orchestrate/runs?{RUN_QUERY}")
}

pub fn agents_url(instance_url: &str) -> String {
    format!("{instance_url}/v1/orchestrate/agents")
}

/// Map a non-success status to an error.
pub fn status_to_error(status: u16, body: &str) -> ProxyError {
    match status {
        401 | 403 => ProxyError::Authentication(body.to_string()),
        _ => ProxyError::api(status, body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_carry_bearer_and_api_key() {
        let headers = orchestrate_headers("tok", "key");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
        assert_eq!(headers.get("IAM-API_KEY").unwrap(), "key");
        assert!(headers.get("iam-api_key").unwrap().is_sensitive());
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
    }

    #[test]
    fn run_url_includes_streaming_query() {
        assert_eq!(
            runs_url("https://wxo.test/instances/1"),
            "https://wxo.test/instances/1/v1/orchestrate/runs?stream=true&stream_timeout=120000&multiple_content=true"
        );
    }

    #[test]
    fn auth_statuses_map_to_authentication_errors() {
        assert!(matches!(status_to_error(401, "no"), ProxyError::Authentication(_)));
        assert!(matches!(
            status_to_error(502, "bad gateway"),
            ProxyError::Api { status: 502, .. }
        ));
    }
}
