//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `SessionManager`: login, signup and logout over a `CredentialStore`
//! - `SecretPolicy`: how secrets are sealed and compared
//! - `validation`: the rules the login and signup forms enforce
//!
//! Sessions persist until logout; there is no expiry.

pub mod policy;
pub mod session;
pub mod validation;

pub use policy::{Argon2Policy, Plaintext, SecretPolicy, SecretPolicyKind};
pub use session::{NavigationNotifier, SessionManager, SessionManagerBuilder, SIMULATED_LATENCY};
