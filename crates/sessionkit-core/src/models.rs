//! Data models for users and the session.
//!
//! - `UserRecord`: persisted row of the user table, secret included
//! - `PublicUser`: what the rest of the application is allowed to see
//! - `SessionState`: the authenticated/loading status of the process

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user as stored in the user table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Output of the active `SecretPolicy::seal`.
    pub secret: String,
}

impl UserRecord {
    /// Build a record with a freshly generated identifier.
    pub fn new(name: impl Into<String>, email: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            secret: secret.into(),
        }
    }

    /// Project to the secret-free view.
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// User-identifying fields safe to expose outside the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Coarse state machine position of a `SessionState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Initial,
    ReadyAuthenticated,
    ReadyUnauthenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SessionState {
    pub current_user: Option<PublicUser>,
    pub is_loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current_user: None,
            is_loading: true,
        }
    }
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    pub fn phase(&self) -> SessionPhase {
        match (self.is_loading, &self.current_user) {
            (true, _) => SessionPhase::Initial,
            (false, Some(_)) => SessionPhase::ReadyAuthenticated,
            (false, None) => SessionPhase::ReadyUnauthenticated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_ids_are_unique() {
        let a = UserRecord::new("A", "a@x.com", "secret1");
        let b = UserRecord::new("A", "a@x.com", "secret1");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_public_projection_has_no_secret() {
        let record = UserRecord::new("A", "a@x.com", "secret1");
        let public = record.to_public();
        assert_eq!(public.id, record.id);
        assert_eq!(public.email, "a@x.com");

        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("secret").is_none());
        assert_eq!(json.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_session_phase() {
        let mut state = SessionState::default();
        assert_eq!(state.phase(), SessionPhase::Initial);
        assert!(!state.is_authenticated());

        state.is_loading = false;
        assert_eq!(state.phase(), SessionPhase::ReadyUnauthenticated);

        state.current_user = Some(UserRecord::new("A", "a@x.com", "s").to_public());
        assert_eq!(state.phase(), SessionPhase::ReadyAuthenticated);
        assert!(state.is_authenticated());
    }

    #[test]
    fn test_record_parses_from_table_json() {
        let json = r#"[{"id":"1","name":"Test User","email":"test@example.com","secret":"password"}]"#;
        let table: Vec<UserRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].secret, "password");
    }
}
