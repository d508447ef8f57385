//! End-to-end session flows over the file-backed store.

use std::sync::Arc;
use std::time::Duration;

use sessionkit_core::{
    AuthError, CredentialStore, FileStore, SessionManager, SessionPhase, StoreKey, UserRecord,
};

fn open(dir: &std::path::Path) -> (FileStore, SessionManager) {
    let store = FileStore::new(dir).unwrap();
    let session = SessionManager::builder(Arc::new(store.clone()))
        .latency(Duration::ZERO)
        .build();
    (store, session)
}

async fn table_len(store: &FileStore) -> usize {
    match store.get(StoreKey::UserTable).await.unwrap() {
        Some(raw) => serde_json::from_str::<Vec<UserRecord>>(&raw).unwrap().len(),
        None => 0,
    }
}

#[tokio::test]
async fn test_signup_logout_login_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let (store, session) = open(dir.path());

    let state = session.initialize().await;
    assert_eq!(state.phase(), SessionPhase::ReadyUnauthenticated);

    let user = session
        .signup("Test User", "test@example.com", "password")
        .await
        .unwrap();
    assert_eq!(user.email, "test@example.com");
    assert_eq!(session.current_user().unwrap().email, "test@example.com");
    assert_eq!(table_len(&store).await, 1);

    session.logout().await;
    assert!(session.current_user().is_none());
    assert_eq!(store.get(StoreKey::CurrentUser).await.unwrap(), None);

    let user = session.login("test@example.com", "password").await.unwrap();
    assert_eq!(user.email, "test@example.com");
    assert_eq!(session.state().phase(), SessionPhase::ReadyAuthenticated);
}

#[tokio::test]
async fn test_login_after_restart_keeps_id() {
    let dir = tempfile::tempdir().unwrap();

    let signed_up = {
        let (_, session) = open(dir.path());
        session.initialize().await;
        let user = session.signup("A", "a@x.com", "secret1").await.unwrap();
        session.logout().await;
        user
    };

    let (_, session) = open(dir.path());
    let state = session.initialize().await;
    assert!(state.current_user.is_none());

    let user = session.login("a@x.com", "secret1").await.unwrap();
    assert_eq!(user.id, signed_up.id);
}

#[tokio::test]
async fn test_restart_restores_signed_in_user() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (_, session) = open(dir.path());
        session.initialize().await;
        session.signup("A", "a@x.com", "secret1").await.unwrap();
    }

    let (_, session) = open(dir.path());
    let state = session.initialize().await;
    assert_eq!(state.phase(), SessionPhase::ReadyAuthenticated);
    assert_eq!(state.current_user.unwrap().email, "a@x.com");

    let persisted = std::fs::read_to_string(dir.path().join("current-user.json")).unwrap();
    assert!(!persisted.contains("secret"));
}

#[tokio::test]
async fn test_duplicate_signup_leaves_table_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let (store, session) = open(dir.path());
    session.initialize().await;
    session.signup("A", "a@x.com", "secret1").await.unwrap();

    let err = session.signup("B", "a@x.com", "other-secret").await.unwrap_err();
    assert!(matches!(err, AuthError::EmailTaken));
    assert_eq!(table_len(&store).await, 1);
    assert_eq!(session.current_user().unwrap().name, "A");
}

#[tokio::test]
async fn test_corrupt_table_fails_login_generically() {
    let dir = tempfile::tempdir().unwrap();
    let (store, session) = open(dir.path());
    store.set(StoreKey::UserTable, "not json").await.unwrap();

    let state = session.initialize().await;
    assert!(!state.is_loading);

    let err = session.login("a@x.com", "secret1").await.unwrap_err();
    assert!(matches!(err, AuthError::Corrupt { .. }));
    assert!(!err.is_domain());
}
