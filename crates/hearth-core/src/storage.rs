// ── Persistent key-value port ──
//
// The narrow storage contract this core consumes: the embedding shell
// brings whatever backs it (mobile preference store, file, keychain).
// Used for the credential cache and cached auth tokens.

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

/// Credential-cache or token I/O failed.
#[derive(Debug, Error)]
#[error("Storage failure: {message}")]
pub struct StorageError {
    pub message: String,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// String-valued persistent key-value store.
///
/// Implementations must be safe for serialized access from the
/// cooperative scheduler; no internal locking contract beyond that.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// In-memory store for tests and embedders without a platform store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for the common `Arc<dyn KvStore>` injection shape.
    pub fn shared() -> Arc<dyn KvStore> {
        Arc::new(Self::new())
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.entries.clear();
        Ok(())
    }
}
