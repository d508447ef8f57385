use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CredentialStore, StoreKey};
use crate::error::StorageError;

/// In-process store. Clones share the same map, so a second
/// `SessionManager` built over a clone sees what the first one wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<StoreKey, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a value is currently stored under `key`.
    pub async fn contains(&self, key: StoreKey) -> bool {
        self.entries.read().await.contains_key(&key)
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, key: StoreKey) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(&key).cloned())
    }

    async fn set(&self, key: StoreKey, value: &str) -> Result<(), StorageError> {
        self.entries.write().await.insert(key, value.to_string());
        Ok(())
    }

    async fn delete(&self, key: StoreKey) -> Result<(), StorageError> {
        self.entries.write().await.remove(&key);
        Ok(())
    }
}
