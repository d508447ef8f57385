use async_trait::async_trait;
use keyring::Entry;
use tracing::debug;

use super::{CredentialStore, StoreKey};
use crate::error::StorageError;

/// Default keychain service name.
pub const SERVICE_NAME: &str = "sessionkit";

/// Largest password Windows Credential Manager accepts.
pub const WINDOWS_MAX_VALUE_LEN: usize = 2560;

/// Platform cap on a single keychain value, if one is known.
fn platform_max_value_len() -> Option<usize> {
    if cfg!(windows) {
        Some(WINDOWS_MAX_VALUE_LEN)
    } else {
        None
    }
}

/// Keeps each key as a password entry in the OS keychain.
///
/// The whole `user-table` is a single entry, so on platforms that cap
/// password size (Windows: 2560 bytes) signups fail with
/// `StorageError::ValueTooLarge` once the table outgrows the cap. Use the
/// file backend for more than a handful of accounts there.
///
/// The keychain API is blocking, so every call runs on the blocking pool.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
    max_value_len: Option<usize>,
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new(SERVICE_NAME)
    }
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            max_value_len: platform_max_value_len(),
        }
    }

    /// Override the per-value size cap. `None` disables the check.
    pub fn with_max_value_len(mut self, max: Option<usize>) -> Self {
        self.max_value_len = max;
        self
    }

    fn check_len(&self, key: StoreKey, value: &str) -> Result<(), StorageError> {
        match self.max_value_len {
            Some(max) if value.len() > max => Err(StorageError::ValueTooLarge {
                key,
                len: value.len(),
                max,
            }),
            _ => Ok(()),
        }
    }

    fn entry(service: &str, key: StoreKey) -> Result<Entry, StorageError> {
        Entry::new(service, key.as_str()).map_err(|source| StorageError::Keyring { key, source })
    }
}

#[async_trait]
impl CredentialStore for KeyringStore {
    async fn get(&self, key: StoreKey) -> Result<Option<String>, StorageError> {
        let service = self.service.clone();
        tokio::task::spawn_blocking(move || -> Result<Option<String>, StorageError> {
            let entry = Self::entry(&service, key)?;
            match entry.get_password() {
                Ok(value) => Ok(Some(value)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(source) => Err(StorageError::Keyring { key, source }),
            }
        })
        .await?
    }

    async fn set(&self, key: StoreKey, value: &str) -> Result<(), StorageError> {
        self.check_len(key, value)?;
        let service = self.service.clone();
        let value = value.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), StorageError> {
            Self::entry(&service, key)?
                .set_password(&value)
                .map_err(|source| StorageError::Keyring { key, source })?;
            debug!(%key, "Stored keychain entry");
            Ok(())
        })
        .await?
    }

    async fn delete(&self, key: StoreKey) -> Result<(), StorageError> {
        let service = self.service.clone();
        tokio::task::spawn_blocking(move || -> Result<(), StorageError> {
            match Self::entry(&service, key)?.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(source) => Err(StorageError::Keyring { key, source }),
            }
        })
        .await?
    }
}
