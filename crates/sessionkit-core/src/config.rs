//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the data directory, storage backend, secret policy,
//! simulated latency and the last used email.
//!
//! Configuration is stored at `~/.config/sessionkit/config.json` and can be
//! overridden with `SESSIONKIT_*` environment variables.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::SecretPolicyKind;
use crate::store::{CredentialStore, FileStore, KeyringStore};

/// Application name used for config/data directory paths
const APP_NAME: &str = "sessionkit";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Data directory used when the platform has none.
const FALLBACK_DATA_DIR: &str = "./sessionkit-data";

pub const ENV_DATA_DIR: &str = "SESSIONKIT_DATA_DIR";
pub const ENV_LATENCY_MS: &str = "SESSIONKIT_LATENCY_MS";
pub const ENV_SECRET_POLICY: &str = "SESSIONKIT_SECRET_POLICY";
pub const ENV_BACKEND: &str = "SESSIONKIT_BACKEND";
pub const ENV_EMAIL: &str = "SESSIONKIT_EMAIL";

/// Where the credential store keeps its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    /// OS keychain. Each key is one entry, so the user table is subject to
    /// the platform's password size limit (2560 bytes on Windows).
    Keyring,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(StoreBackend::File),
            "keyring" => Ok(StoreBackend::Keyring),
            other => Err(format!("unknown store backend: {}", other)),
        }
    }
}

fn default_latency_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    #[serde(default)]
    pub secret_policy: SecretPolicyKind,
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default)]
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            latency_ms: default_latency_ms(),
            secret_policy: SecretPolicyKind::default(),
            backend: StoreBackend::default(),
            last_email: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply `SESSIONKIT_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from any variable source. Unparseable values are
    /// logged and skipped.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = lookup(ENV_LATENCY_MS) {
            match raw.trim().parse() {
                Ok(ms) => self.latency_ms = ms,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring {}", ENV_LATENCY_MS),
            }
        }
        if let Some(raw) = lookup(ENV_SECRET_POLICY) {
            match raw.parse() {
                Ok(policy) => self.secret_policy = policy,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring {}", ENV_SECRET_POLICY),
            }
        }
        if let Some(raw) = lookup(ENV_BACKEND) {
            match raw.parse() {
                Ok(backend) => self.backend = backend,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring {}", ENV_BACKEND),
            }
        }
        if let Some(email) = lookup(ENV_EMAIL).filter(|e| !e.is_empty()) {
            self.last_email = Some(email);
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.data_dir {
            return dir.clone();
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_NAME))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    /// Build the credential store selected by `backend`.
    pub fn open_store(&self) -> Result<Arc<dyn CredentialStore>> {
        match self.backend {
            StoreBackend::File => {
                let dir = self.data_dir();
                let store = FileStore::new(&dir)
                    .with_context(|| format!("Failed to open data directory {}", dir.display()))?;
                Ok(Arc::new(store))
            }
            StoreBackend::Keyring => Ok(Arc::new(KeyringStore::default())),
        }
    }
}
