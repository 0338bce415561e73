//! wxo-bridge — proxy for watsonx Orchestrate agent runs.
//!
//! Keeps one bearer token valid for every concurrent caller, posts
//! messages to the orchestration run endpoint and folds the NDJSON
//! response into a single [`orchestrate::RunResult`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use wxo_bridge::prelude::*;
//!
//! # async fn example() -> wxo_bridge::error::Result<()> {
//! let config = BridgeConfig::from_env();
//! config.validate()?;
//! let tokens = Arc::new(TokenManager::from_config(&config));
//! let runner = AgentRunner::new(config, tokens)?;
//!
//! let result = runner.run("Hello!", "71fb5aac-c8c8-4c29", None).await;
//! println!("{}", result.content);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod orchestrate;
pub mod prelude;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
