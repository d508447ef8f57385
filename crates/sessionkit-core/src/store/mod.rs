//! Durable key-value persistence for session data.
//!
//! The `CredentialStore` trait is the only boundary the session manager
//! persists through. Backends:
//!
//! - `FileStore`: one JSON file per key in a data directory
//! - `MemoryStore`: shared in-process map, used by tests and demos
//! - `KeyringStore`: OS keychain entries via `keyring`

use std::fmt;

use async_trait::async_trait;

use crate::error::StorageError;

pub mod file;
pub mod keychain;
pub mod memory;

pub use file::FileStore;
pub use keychain::KeyringStore;
pub use memory::MemoryStore;

/// The two fixed keys the session manager persists under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Serialized `PublicUser` of the signed-in user.
    CurrentUser,
    /// Serialized array of every `UserRecord`.
    UserTable,
}

impl StoreKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::CurrentUser => "current-user",
            StoreKey::UserTable => "user-table",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text-valued key-value store with non-blocking operations.
///
/// `get` of a key that was never written returns `Ok(None)`, and `delete` of
/// a missing key succeeds. Each call is atomic on its own; sequences of calls
/// are not.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, key: StoreKey) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: StoreKey, value: &str) -> Result<(), StorageError>;

    async fn delete(&self, key: StoreKey) -> Result<(), StorageError>;
}
