use std::fmt;

use serde::{Deserialize, Serialize};

use super::decoder::DecodedRun;

/// Uniform outcome of one agent run.
///
/// Every failure (auth, upstream status, transport) is folded into this
/// shape with `success == false` and `error` set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub success: bool,
    /// Run endpoint status; absent when no response was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    pub thread_id: Option<String>,
    pub run_id: Option<String>,
    pub content: String,
    /// Raw response body, kept for diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunResult {
    /// Successful run built from a decoded body.
    pub fn decoded(status: u16, decoded: DecodedRun, raw: String) -> Self {
        Self {
            success: true,
            status_code: Some(status),
            thread_id: decoded.thread_id,
            run_id: decoded.run_id,
            content: decoded.content,
            raw_response: Some(raw),
            error: None,
        }
    }

    /// The run endpoint answered with a non-success status.
    pub fn upstream_failure(status: u16, body: String) -> Self {
        Self {
            success: false,
            status_code: Some(status),
            thread_id: None,
            run_id: None,
            content: String::new(),
            raw_response: Some(body),
            error: Some(format!("upstream returned status {status}")),
        }
    }

    /// No usable response was obtained.
    pub fn failure(error: impl fmt::Display) -> Self {
        Self {
            success: false,
            status_code: None,
            thread_id: None,
            run_id: None,
            content: String::new(),
            raw_response: None,
            error: Some(error.to_string()),
        }
    }
}
