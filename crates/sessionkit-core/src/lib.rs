//! Core library for sessionkit.
//!
//! This crate holds everything a front-end needs to run a local,
//! single-user authentication session:
//!
//! - `models`: `UserRecord`, `PublicUser` and `SessionState`
//! - `store`: the async `CredentialStore` contract and its backends
//! - `auth`: the `SessionManager`, secret policies and form validation
//! - `config`: application configuration with environment overrides

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use auth::{NavigationNotifier, SessionManager};
pub use config::Config;
pub use error::{AuthError, Operation, StorageError};
pub use models::{PublicUser, SessionPhase, SessionState, UserRecord};
pub use store::{CredentialStore, FileStore, KeyringStore, MemoryStore, StoreKey};
