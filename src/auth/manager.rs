use std::sync::RwLock;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::auth::error::AuthError;
use crate::auth::token::{Credential, DEFAULT_LIFETIME_SECS};
use crate::config::BridgeConfig;

pub const DEFAULT_IDENTITY_URL: &str = "https://iam.cloud.ibm.com/identity/token";
/// Upper bound on one key exchange, body download included.
pub const DEFAULT_IDENTITY_TIMEOUT: Duration = Duration::from_secs(30);
const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Holds the single bearer credential shared by every outbound call.
///
/// Reads of a valid credential only take a shared lock. Refreshing is
/// serialized by `refresh_lock`; callers that queue behind an in-flight
/// refresh re-check the credential and reuse the refreshed token.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use wxo_bridge::auth::TokenManager;
///
/// # async fn example() -> Result<(), wxo_bridge::auth::AuthError> {
/// let tokens = Arc::new(TokenManager::new("my-api-key"));
/// let bearer = tokens.get_token().await?;
/// # let _ = bearer;
/// # Ok(())
/// # }
/// ```
pub struct TokenManager {
    client: reqwest::Client,
    api_key: String,
    identity_url: String,
    request_timeout: Duration,
    credential: RwLock<Option<Credential>>,
    refresh_lock: Mutex<()>,
}

impl TokenManager {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            request_timeout: DEFAULT_IDENTITY_TIMEOUT,
            credential: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Build a manager from bridge configuration. The key exchange is
    /// bounded by the configured run timeout.
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(config.api_key())
            .with_identity_url(config.identity_url())
            .with_request_timeout(config.run_timeout())
    }

    pub fn with_identity_url(mut self, url: impl Into<String>) -> Self {
        self.identity_url = url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Seed the manager with an existing credential.
    pub fn with_credential(self, credential: Credential) -> Self {
        self.store(Some(credential));
        self
    }

    pub fn identity_url(&self) -> &str {
        &self.identity_url
    }

    /// Current credential, valid or not, without refreshing.
    pub fn credential(&self) -> Option<Credential> {
        self.credential.read().ok()?.clone()
    }

    /// Drop the held credential so the next `get_token` refreshes.
    pub fn invalidate(&self) {
        self.store(None);
    }

    /// Drop the held credential only if it still carries `token`.
    ///
    /// A credential refreshed since `token` was handed out is kept.
    /// Returns whether anything was dropped.
    pub fn invalidate_if(&self, token: &str) -> bool {
        let mut guard = match self.credential.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.as_ref().is_some_and(|held| held.token() == token) {
            *guard = None;
            true
        } else {
            false
        }
    }

    /// Return a valid bearer token, refreshing it if needed.
    pub async fn get_token(&self) -> Result<String, AuthError> {
        Ok(self.get_credential().await?.token().to_string())
    }

    /// Return a valid credential, refreshing it if needed.
    pub async fn get_credential(&self) -> Result<Credential, AuthError> {
        if let Some(credential) = self.valid_credential() {
            return Ok(credential);
        }

        let _guard = self.refresh_lock.lock().await;
        if let Some(credential) = self.valid_credential() {
            debug!("bearer token refreshed by a concurrent caller");
            return Ok(credential);
        }

        let credential = self.refresh().await?;
        self.store(Some(credential.clone()));
        Ok(credential)
    }

    fn valid_credential(&self) -> Option<Credential> {
        let guard = self.credential.read().ok()?;
        guard
            .as_ref()
            .filter(|credential| credential.is_valid_at(Utc::now()))
            .cloned()
    }

    fn store(&self, credential: Option<Credential>) {
        match self.credential.write() {
            Ok(mut guard) => *guard = credential,
            Err(poisoned) => *poisoned.into_inner() = credential,
        }
    }

    async fn refresh(&self) -> Result<Credential, AuthError> {
        if self.api_key.is_empty() {
            return Err(AuthError::Configuration("API key is empty".to_string()));
        }

        debug!(url = %self.identity_url, "requesting bearer token");
        let resp = self
            .client
            .post(&self.identity_url)
            .timeout(self.request_timeout)
            .header(ACCEPT, "application/json")
            .form(&[
                ("grant_type", APIKEY_GRANT_TYPE),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "identity provider rejected key exchange");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let payload: IdentityTokenResponse = serde_json::from_str(&body)?;
        if payload.access_token.is_empty() {
            return Err(AuthError::InvalidResponse(
                "Identity response has an empty access_token".to_string(),
            ));
        }
        let credential = Credential::from_lifetime(
            payload.access_token,
            payload.expires_in.unwrap_or(DEFAULT_LIFETIME_SECS),
            Utc::now(),
        );
        debug!(
            token_len = credential.len(),
            expires_at = %credential.expires_at(),
            "bearer token refreshed"
        );
        Ok(credential)
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("identity_url", &self.identity_url)
            .field("request_timeout", &self.request_timeout)
            .field("credential", &self.credential())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct IdentityTokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}
