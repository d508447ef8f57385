use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Decides how a secret is stored and how a login attempt is checked.
pub trait SecretPolicy: Send + Sync {
    /// Turn a user-supplied secret into the value kept in the user table.
    fn seal(&self, secret: &str) -> Result<String, AuthError>;

    /// Check a login attempt against a stored value.
    fn verify(&self, candidate: &str, stored: &str) -> bool;
}

/// Stores secrets as given and compares them with plain equality.
///
/// Not suitable for real credentials; kept as the default so existing
/// user tables written in clear text keep working.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plaintext;

impl SecretPolicy for Plaintext {
    fn seal(&self, secret: &str) -> Result<String, AuthError> {
        Ok(secret.to_string())
    }

    fn verify(&self, candidate: &str, stored: &str) -> bool {
        candidate == stored
    }
}

/// Salted Argon2id hashes in PHC string format.
#[derive(Default)]
pub struct Argon2Policy {
    argon2: Argon2<'static>,
}

impl fmt::Debug for Argon2Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argon2Policy").finish_non_exhaustive()
    }
}

impl SecretPolicy for Argon2Policy {
    fn seal(&self, secret: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Policy(e.to_string()))
    }

    fn verify(&self, candidate: &str, stored: &str) -> bool {
        // Values that are not PHC strings (e.g. legacy clear text) never match.
        match PasswordHash::new(stored) {
            Ok(hash) => self
                .argon2
                .verify_password(candidate.as_bytes(), &hash)
                .is_ok(),
            Err(_) => false,
        }
    }
}

/// Configurable choice of secret policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretPolicyKind {
    #[default]
    Plaintext,
    Argon2,
}

impl SecretPolicyKind {
    pub fn build(self) -> Arc<dyn SecretPolicy> {
        match self {
            SecretPolicyKind::Plaintext => Arc::new(Plaintext),
            SecretPolicyKind::Argon2 => Arc::new(Argon2Policy::default()),
        }
    }
}

impl FromStr for SecretPolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plaintext" => Ok(SecretPolicyKind::Plaintext),
            "argon2" => Ok(SecretPolicyKind::Argon2),
            other => Err(format!("unknown secret policy: {}", other)),
        }
    }
}
