use std::path::PathBuf;

use thiserror::Error;

use crate::store::StoreKey;

/// Failure of the underlying persistence medium.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create data directory {}: {source}", path.display())]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on {key}: {source}")]
    Io {
        key: StoreKey,
        #[source]
        source: std::io::Error,
    },

    #[error("Keychain error on {key}: {source}")]
    Keyring {
        key: StoreKey,
        #[source]
        source: keyring::Error,
    },

    #[error("Value for {key} is {len} bytes, over the {max} byte limit of this store")]
    ValueTooLarge { key: StoreKey, len: usize, max: usize },

    #[error("Storage task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Failure returned by session operations.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already in use")]
    EmailTaken,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Malformed data under {key}: {source}")]
    Corrupt {
        key: StoreKey,
        #[source]
        source: serde_json::Error,
    },

    #[error("Secret policy error: {0}")]
    Policy(String),
}

/// Which session operation produced an error, for user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    Signup,
}

impl AuthError {
    /// True for failures the user caused and can fix (bad password, taken email).
    pub fn is_domain(&self) -> bool {
        matches!(self, AuthError::InvalidCredentials | AuthError::EmailTaken)
    }

    /// Message suitable for showing under a form.
    ///
    /// Domain failures keep their own wording; infrastructure failures are
    /// collapsed into a generic message so storage details never reach the UI.
    pub fn user_message(&self, op: Operation) -> String {
        if self.is_domain() {
            return self.to_string();
        }
        match op {
            Operation::Login => "An error occurred during login".to_string(),
            Operation::Signup => "An error occurred during signup".to_string(),
        }
    }
}
