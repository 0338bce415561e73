use thiserror::Error;

use crate::error::ProxyError;

/// Failures while exchanging the API key for a bearer token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Identity provider rejected key exchange (status {status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AuthError {
    /// Upstream status for rejections, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::InvalidResponse(error.to_string())
    }
}

impl From<AuthError> for ProxyError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Configuration(message) => ProxyError::Configuration(message),
            other => ProxyError::Authentication(other.to_string()),
        }
    }
}
