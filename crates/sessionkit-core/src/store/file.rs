use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{CredentialStore, StoreKey};
use crate::error::StorageError;

/// Stores each key as `<key>.json` inside a data directory.
///
/// Writes go to a uniquely named temporary sibling file that is then renamed
/// over the target, so a reader never sees a half-written value and
/// concurrent writers (in this process or another) never share a temp file.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir).map_err(|source| StorageError::DataDir {
            path: data_dir.clone(),
            source,
        })?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn key_path(&self, key: StoreKey) -> PathBuf {
        self.data_dir.join(format!("{}.json", key.as_str()))
    }

    fn temp_path(&self, key: StoreKey) -> PathBuf {
        self.data_dir
            .join(format!(".{}.json.{}.tmp", key.as_str(), Uuid::new_v4().simple()))
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn get(&self, key: StoreKey) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.key_path(key)).await {
            Ok(contents) => {
                debug!(%key, bytes = contents.len(), "Read store file");
                Ok(Some(contents))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { key, source }),
        }
    }

    async fn set(&self, key: StoreKey, value: &str) -> Result<(), StorageError> {
        let tmp = self.temp_path(key);
        let io_err = |source| StorageError::Io { key, source };

        let written = match tokio::fs::write(&tmp, value).await {
            Ok(()) => tokio::fs::rename(&tmp, self.key_path(key)).await,
            Err(e) => Err(e),
        };
        if let Err(source) = written {
            if let Err(e) = tokio::fs::remove_file(&tmp).await {
                if e.kind() != ErrorKind::NotFound {
                    warn!(%key, error = %e, "Failed to remove temp file");
                }
            }
            return Err(io_err(source));
        }
        debug!(%key, bytes = value.len(), "Wrote store file");
        Ok(())
    }

    async fn delete(&self, key: StoreKey) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.key_path(key)).await {
            Ok(()) => {
                debug!(%key, "Removed store file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { key, source }),
        }
    }
}
