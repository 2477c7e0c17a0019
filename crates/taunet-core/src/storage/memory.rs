//! In-memory storage implementation for testing and simulation.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use taunet_proto::TauNetMessage;

use super::{Storage, StorageError};

/// In-memory conversation store.
///
/// Messages are kept per conversation in arrival order. State lives behind
/// `Arc<Mutex<..>>` so clones share it: a test can hand one clone to a
/// running server and inspect the other.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<HashMap<String, Vec<TauNetMessage>>>>,
}

impl MemoryStorage {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages stored under `conversation`, in arrival order.
    pub fn messages(&self, conversation: &str) -> Vec<TauNetMessage> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.get(conversation).cloned().unwrap_or_default()
    }

    /// Total number of stored messages across all conversations.
    pub fn message_count(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.values().map(Vec::len).sum()
    }
}

impl Storage for MemoryStorage {
    fn persist(
        &self,
        conversation: &str,
        message: &TauNetMessage,
    ) -> Result<String, StorageError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let log = inner.entry(conversation.to_string()).or_default();
        log.push(message.clone());
        Ok(format!("memory:{}:{}", conversation, log.len() - 1))
    }

    fn conversations(&self) -> Result<Vec<String>, StorageError> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = inner.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
