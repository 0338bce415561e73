//! Agent dispatch table: agent key -> (remote agent id, canned prompt).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ProxyError;

/// One routable agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRoute {
    /// Opaque agent id on the orchestration instance.
    pub agent_id: String,
    /// Prompt sent when the caller supplies no message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AgentRoute {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            prompt: None,
            description: None,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Pick the caller's message, falling back to the canned prompt.
    ///
    /// Blank messages count as absent.
    pub fn resolve_message(&self, message: Option<&str>) -> Option<String> {
        message
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.prompt.clone())
    }
}

/// Table of agent routes keyed by a short name (e.g. `diet`, `calendar`).
///
/// # Example
/// ```
/// use wxo_bridge::config::AgentTable;
///
/// let table = AgentTable::from_toml_str(r#"
///     [agents.calendar]
///     agent_id = "5c1f0e2a"
///     prompt = "Add the plan to my calendar"
/// "#).unwrap();
/// assert_eq!(table.get("calendar").unwrap().agent_id, "5c1f0e2a");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentTable {
    #[serde(default)]
    agents: BTreeMap<String, AgentRoute>,
}

impl AgentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ProxyError> {
        let table: Self = toml::from_str(raw)?;
        table.validate()?;
        Ok(table)
    }

    /// Load a table from disk. A missing file yields an empty table.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProxyError> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(err) => return Err(ProxyError::Io(err)),
        };
        Self::from_toml_str(&raw).map_err(|err| match err {
            ProxyError::Configuration(message) => {
                ProxyError::Configuration(format!("{}: {message}", path.display()))
            }
            other => other,
        })
    }

    pub fn insert(&mut self, key: impl Into<String>, route: AgentRoute) {
        self.agents.insert(key.into(), route);
    }

    pub fn get(&self, key: &str) -> Option<&AgentRoute> {
        self.agents.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.agents.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AgentRoute)> {
        self.agents.iter().map(|(key, route)| (key.as_str(), route))
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    fn validate(&self) -> Result<(), ProxyError> {
        if let Some((key, _)) = self
            .agents
            .iter()
            .find(|(_, route)| route.agent_id.trim().is_empty())
        {
            return Err(ProxyError::Configuration(format!(
                "Agent '{key}' has an empty agent_id"
            )));
        }
        Ok(())
    }
}
