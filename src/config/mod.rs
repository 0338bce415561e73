//! Bridge configuration (environment + optional agent table file).

pub mod agents;

pub use agents::{AgentRoute, AgentTable};

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::DEFAULT_IDENTITY_URL;
use crate::error::ProxyError;

/// Upper bound on a single run call.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(120);

/// Connection settings for one orchestration instance.
///
/// Environment variables read by [`BridgeConfig::from_env`]:
/// - `IBM_API_KEY` (required)
/// - `INSTANCE_URL` (required)
/// - `IBM_IAM_URL`
/// - `ORCHESTRATE_RUN_TIMEOUT_SECS`
/// - `WXO_AGENTS_FILE`
#[derive(Clone)]
pub struct BridgeConfig {
    api_key: String,
    instance_url: String,
    identity_url: String,
    run_timeout: Duration,
    agents_file: Option<PathBuf>,
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("api_key", &if self.api_key.is_empty() { "" } else { ".." })
            .field("instance_url", &self.instance_url)
            .field("identity_url", &self.identity_url)
            .field("run_timeout", &self.run_timeout)
            .field("agents_file", &self.agents_file)
            .finish()
    }
}

impl BridgeConfig {
    pub fn new(api_key: impl Into<String>, instance_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            instance_url: normalize_url(instance_url.into()),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            run_timeout: DEFAULT_RUN_TIMEOUT,
            agents_file: default_agents_file(),
        }
    }

    /// Load from process environment (and `.env` if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut config = Self::new(
            get("IBM_API_KEY").unwrap_or_default(),
            get("INSTANCE_URL").unwrap_or_default(),
        );
        if let Some(url) = get("IBM_IAM_URL") {
            config.identity_url = url;
        }
        if let Some(secs) = get("ORCHESTRATE_RUN_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok())
        {
            config.run_timeout = Duration::from_secs(secs);
        }
        if let Some(path) = get("WXO_AGENTS_FILE") {
            config.agents_file = Some(PathBuf::from(path));
        }
        config
    }

    /// Report missing required settings.
    pub fn validate(&self) -> Result<(), ProxyError> {
        let missing: Vec<&str> = [
            ("IBM_API_KEY", self.api_key.is_empty()),
            ("INSTANCE_URL", self.instance_url.is_empty()),
        ]
        .into_iter()
        .filter_map(|(name, is_missing)| is_missing.then_some(name))
        .collect();

        if !missing.is_empty() {
            return Err(ProxyError::Configuration(format!(
                "Missing environment variables: {}",
                missing.join(", ")
            )));
        }
        if self.run_timeout.is_zero() {
            return Err(ProxyError::Configuration(
                "Run timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_identity_url(mut self, url: impl Into<String>) -> Self {
        self.identity_url = url.into();
        self
    }

    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = timeout;
        self
    }

    pub fn with_agents_file(mut self, path: Option<PathBuf>) -> Self {
        self.agents_file = path;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    pub fn identity_url(&self) -> &str {
        &self.identity_url
    }

    pub fn run_timeout(&self) -> Duration {
        self.run_timeout
    }

    pub fn agents_file(&self) -> Option<&PathBuf> {
        self.agents_file.as_ref()
    }

    /// Load the agent table named by this config (empty if unset or missing).
    pub fn load_agents(&self) -> Result<AgentTable, ProxyError> {
        match &self.agents_file {
            Some(path) => AgentTable::load(path),
            None => Ok(AgentTable::new()),
        }
    }
}

fn normalize_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn default_agents_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "wxo-bridge")
        .map(|dirs| dirs.config_dir().join("agents.toml"))
}
