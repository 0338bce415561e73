//! Single entry point for sending a message to an agent.

use std::sync::Arc;

use bon::Builder;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use serde::Serialize;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use super::decoder::StreamDecoder;
use super::http::{agents_url, build_client, orchestrate_headers, runs_url, status_to_error};
use super::result::RunResult;
use super::threads::ThreadRegistry;
use crate::auth::TokenManager;
use crate::config::{AgentTable, BridgeConfig};
use crate::error::ProxyError;
use crate::util::timeout::with_timeout;

/// One message addressed to one agent.
///
/// # Example
/// ```
/// use wxo_bridge::orchestrate::RunRequest;
///
/// let request = RunRequest::builder()
///     .message("Plan my week")
///     .agent_id("71fb5aac")
///     .build();
/// assert!(request.thread_id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct RunRequest {
    #[builder(into)]
    pub message: String,
    #[builder(into)]
    pub agent_id: String,
    /// `None` starts a new thread on the remote side.
    pub thread_id: Option<String>,
}

#[derive(Serialize)]
struct RunPayload<'a> {
    message: UserMessage<'a>,
    agent_id: &'a str,
    thread_id: Option<&'a str>,
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a RunRequest> for RunPayload<'a> {
    fn from(request: &'a RunRequest) -> Self {
        Self {
            message: UserMessage {
                role: "user",
                content: &request.message,
            },
            agent_id: &request.agent_id,
            thread_id: request.thread_id.as_deref().filter(|t| !t.is_empty()),
        }
    }
}

/// Composes the token manager, the run endpoint and the stream decoder.
///
/// Runs never return `Err`: every failure is folded into a [`RunResult`].
/// No call is retried.
pub struct AgentRunner {
    client: reqwest::Client,
    config: BridgeConfig,
    tokens: Arc<TokenManager>,
    agents: AgentTable,
    threads: ThreadRegistry,
}

impl AgentRunner {
    pub fn new(config: BridgeConfig, tokens: Arc<TokenManager>) -> Result<Self, ProxyError> {
        Ok(Self {
            client: build_client()?,
            config,
            tokens,
            agents: AgentTable::new(),
            threads: ThreadRegistry::new(),
        })
    }

    pub fn with_agents(mut self, agents: AgentTable) -> Self {
        self.agents = agents;
        self
    }

    pub fn with_threads(mut self, threads: ThreadRegistry) -> Self {
        self.threads = threads;
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    pub fn agents(&self) -> &AgentTable {
        &self.agents
    }

    pub fn threads(&self) -> &ThreadRegistry {
        &self.threads
    }

    /// Send `message` to `agent_id`, continuing `thread_id` if given.
    pub async fn run(&self, message: &str, agent_id: &str, thread_id: Option<&str>) -> RunResult {
        let request = RunRequest::builder()
            .message(message)
            .agent_id(agent_id)
            .maybe_thread_id(thread_id.map(str::to_string))
            .build();
        self.execute(&request).await
    }

    pub async fn execute(&self, request: &RunRequest) -> RunResult {
        let request_id = Uuid::new_v4();
        let span = info_span!("orchestrate_run", %request_id, agent_id = %request.agent_id);
        self.execute_inner(request).instrument(span).await
    }

    async fn execute_inner(&self, request: &RunRequest) -> RunResult {
        let token = match self.tokens.get_token().await {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "bearer token unavailable");
                return RunResult::failure(ProxyError::from(err));
            }
        };

        let outcome = with_timeout(self.config.run_timeout(), self.send_run(&token, request)).await;
        match outcome {
            Ok((status, body)) if (200..300).contains(&status) => {
                let decoded = StreamDecoder::decode(&body);
                debug!(
                    status,
                    thread_id = decoded.thread_id.as_deref().unwrap_or("-"),
                    run_id = decoded.run_id.as_deref().unwrap_or("-"),
                    content_len = decoded.content.len(),
                    "run completed"
                );
                RunResult::decoded(status, decoded, body)
            }
            Ok((status, body)) => {
                warn!(status, "run endpoint returned an error");
                if status == 401 && self.tokens.invalidate_if(&token) {
                    debug!("dropped rejected bearer token");
                }
                RunResult::upstream_failure(status, body)
            }
            Err(err) => {
                warn!(error = %err, "run call failed");
                RunResult::failure(err)
            }
        }
    }

    async fn send_run(
        &self,
        token: &str,
        request: &RunRequest,
    ) -> Result<(u16, String), ProxyError> {
        debug!(has_thread = request.thread_id.is_some(), "posting run");
        let resp = self
            .client
            .post(runs_url(self.config.instance_url()))
            .headers(orchestrate_headers(token, self.config.api_key()))
            .json(&RunPayload::from(request))
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok((status, body))
    }

    /// Run a configured agent by key, using its canned prompt when
    /// `message` is absent or blank.
    pub async fn run_route(
        &self,
        key: &str,
        message: Option<&str>,
        thread_id: Option<&str>,
    ) -> RunResult {
        let Some(route) = self.agents.get(key) else {
            return RunResult::failure(format!("Unknown agent key: {key}"));
        };
        let Some(message) = route.resolve_message(message) else {
            return RunResult::failure(format!(
                "Agent '{key}' has no canned prompt and no message was supplied"
            ));
        };
        self.run(&message, &route.agent_id, thread_id).await
    }

    /// Run within a caller conversation, reusing and recording its thread.
    pub async fn run_in_conversation(
        &self,
        conversation_id: &str,
        message: &str,
        agent_id: &str,
    ) -> RunResult {
        let thread_id = self.threads.get(conversation_id);
        let result = self.run(message, agent_id, thread_id.as_deref()).await;
        if result.success {
            if let Some(thread_id) = &result.thread_id {
                self.threads.remember(conversation_id, thread_id.clone());
            }
        }
        result
    }

    /// List the agents deployed on the instance.
    pub async fn list_agents(&self) -> Result<serde_json::Value, ProxyError> {
        let token = self.tokens.get_token().await?;
        let body = with_timeout(self.config.run_timeout(), self.fetch_agents(&token)).await?;
        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body)))
    }

    async fn fetch_agents(&self, token: &str) -> Result<String, ProxyError> {
        let mut request = self
            .client
            .get(agents_url(self.config.instance_url()))
            .header(ACCEPT, "application/json");
        if let Ok(val) = HeaderValue::from_str(&format!("Bearer {token}")) {
            request = request.header(AUTHORIZATION, val);
        }
        let resp = request.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        if !(200..300).contains(&status) {
            return Err(status_to_error(status, &body));
        }
        Ok(body)
    }
}

impl std::fmt::Debug for AgentRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRunner")
            .field("config", &self.config)
            .field("agents", &self.agents.len())
            .field("threads", &self.threads.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_matches_wire_shape() {
        let request = RunRequest::builder()
            .message("hi")
            .agent_id("agent-1")
            .thread_id("t1".to_string())
            .build();
        let value = serde_json::to_value(RunPayload::from(&request)).unwrap();
        assert_eq!(
            value,
            json!({
                "message": {"role": "user", "content": "hi"},
                "agent_id": "agent-1",
                "thread_id": "t1"
            })
        );
    }

    #[test]
    fn empty_thread_id_is_sent_as_null() {
        let request = RunRequest::builder()
            .message("hi")
            .agent_id("agent-1")
            .thread_id(String::new())
            .build();
        let value = serde_json::to_value(RunPayload::from(&request)).unwrap();
        assert_eq!(value["thread_id"], serde_json::Value::Null);
    }
}
