//! Convenience re-exports for common use.

pub use crate::auth::{AuthError, Credential, TokenManager};
pub use crate::config::{AgentRoute, AgentTable, BridgeConfig};
pub use crate::error::{ProxyError, Result};
pub use crate::orchestrate::{
    AgentRunner, DecodedRun, RunRequest, RunResult, StreamDecoder, ThreadRegistry,
};
