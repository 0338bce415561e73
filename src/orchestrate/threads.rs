use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::ProxyError;

/// Maps caller conversation ids to remote thread ids.
///
/// Cloning yields another handle to the same map.
#[derive(Debug, Clone, Default)]
pub struct ThreadRegistry {
    threads: Arc<RwLock<HashMap<String, String>>>,
}

impl ThreadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, conversation_id: &str) -> Option<String> {
        self.threads.read().ok()?.get(conversation_id).cloned()
    }

    pub fn remember(&self, conversation_id: impl Into<String>, thread_id: impl Into<String>) {
        if let Ok(mut threads) = self.threads.write() {
            threads.insert(conversation_id.into(), thread_id.into());
        }
    }

    pub fn forget(&self, conversation_id: &str) -> Option<String> {
        self.threads.write().ok()?.remove(conversation_id)
    }

    /// Thread for a conversation, or an error if none was started yet.
    pub fn require(&self, conversation_id: &str) -> Result<String, ProxyError> {
        self.get(conversation_id).ok_or_else(|| {
            ProxyError::InvalidState(format!(
                "No thread found for conversation {conversation_id}; run an agent first"
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.threads.read().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
