use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::policy::{Plaintext, SecretPolicy};
use crate::error::AuthError;
use crate::models::{PublicUser, SessionState, UserRecord};
use crate::store::{CredentialStore, StoreKey};

/// Delay applied to login and signup, modeling a remote call.
pub const SIMULATED_LATENCY: Duration = Duration::from_millis(1000);

/// Receives the request to send the user back to the signed-out entry point.
///
/// Called only from `SessionManager::logout`, after the session is cleared.
pub trait NavigationNotifier: Send + Sync {
    fn reset_to_entry_point(&self);
}

pub struct SessionManagerBuilder {
    store: Arc<dyn CredentialStore>,
    policy: Arc<dyn SecretPolicy>,
    latency: Duration,
    notifier: Option<Arc<dyn NavigationNotifier>>,
}

impl SessionManagerBuilder {
    pub fn policy(mut self, policy: Arc<dyn SecretPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn NavigationNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn build(self) -> SessionManager {
        let (state_tx, _) = watch::channel(SessionState::default());
        SessionManager {
            store: self.store,
            policy: self.policy,
            latency: self.latency,
            notifier: RwLock::new(self.notifier),
            users: Mutex::new(Vec::new()),
            state_tx,
        }
    }
}

/// Owns the session state of the running process.
///
/// One instance is created by the hosting UI at start-up, `initialize`d once,
/// and shared (usually behind an `Arc`) with whatever needs to sign users in
/// or out. The in-memory user table lock is held for the whole of each
/// operation, so concurrent calls on one instance run one at a time.
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    policy: Arc<dyn SecretPolicy>,
    latency: Duration,
    notifier: RwLock<Option<Arc<dyn NavigationNotifier>>>,
    users: Mutex<Vec<UserRecord>>,
    state_tx: watch::Sender<SessionState>,
}

impl SessionManager {
    /// Manager with the plaintext policy, default latency and no notifier.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self::builder(store).build()
    }

    pub fn builder(store: Arc<dyn CredentialStore>) -> SessionManagerBuilder {
        SessionManagerBuilder {
            store,
            policy: Arc::new(Plaintext),
            latency: SIMULATED_LATENCY,
            notifier: None,
        }
    }

    // =========================================================================
    // State access
    // =========================================================================

    /// Snapshot of the current session state.
    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    pub fn current_user(&self) -> Option<PublicUser> {
        self.state_tx.borrow().current_user.clone()
    }

    /// Receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Replace (or clear) the navigation notifier used by `logout`.
    pub fn set_notifier(&self, notifier: Option<Arc<dyn NavigationNotifier>>) {
        match self.notifier.write() {
            Ok(mut slot) => *slot = notifier,
            Err(poisoned) => *poisoned.into_inner() = notifier,
        }
    }

    /// Number of users in the in-memory table.
    pub async fn user_count(&self) -> usize {
        self.users.lock().await.len()
    }

    fn publish(&self, current_user: Option<PublicUser>) {
        self.state_tx.send_replace(SessionState {
            current_user,
            is_loading: false,
        });
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Load the persisted session and user table.
    ///
    /// Never fails: unreadable or malformed data is logged and treated as
    /// absent. Always leaves the state out of loading.
    pub async fn initialize(&self) -> SessionState {
        let mut users = self.users.lock().await;

        let current_user = match self.read_json::<PublicUser>(StoreKey::CurrentUser).await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Ignoring stored session");
                None
            }
        };

        *users = match self.read_json::<Vec<UserRecord>>(StoreKey::UserTable).await {
            Ok(table) => table.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Ignoring stored user table");
                Vec::new()
            }
        };

        debug!(
            users = users.len(),
            authenticated = current_user.is_some(),
            "Session initialized"
        );
        self.publish(current_user);
        self.state()
    }

    /// Sign in with an email and secret.
    ///
    /// The user table is re-read from the store first so signups made by
    /// another process are visible.
    pub async fn login(&self, email: &str, secret: &str) -> Result<PublicUser, AuthError> {
        tokio::time::sleep(self.latency).await;

        let mut users = self.users.lock().await;
        *users = self.load_table().await?;

        let found = users
            .iter()
            .find(|u| u.email == email && self.policy.verify(secret, &u.secret));

        let Some(record) = found else {
            info!(email, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let user = record.to_public();
        self.persist_current_user(&user).await?;
        self.publish(Some(user.clone()));
        info!(email, user_id = %user.id, "Login successful");
        Ok(user)
    }

    /// Register a new user and sign them in.
    ///
    /// Fails with `EmailTaken` when a user with exactly this email exists.
    pub async fn signup(&self, name: &str, email: &str, secret: &str) -> Result<PublicUser, AuthError> {
        tokio::time::sleep(self.latency).await;

        let mut users = self.users.lock().await;
        *users = self.load_table().await?;

        if users.iter().any(|u| u.email == email) {
            info!(email, "Signup rejected, email in use");
            return Err(AuthError::EmailTaken);
        }

        let record = UserRecord::new(name, email, self.policy.seal(secret)?);
        let user = record.to_public();

        users.push(record);
        if let Err(e) = self.write_json(StoreKey::UserTable, &*users).await {
            users.pop();
            return Err(e);
        }

        self.persist_current_user(&user).await?;
        self.publish(Some(user.clone()));
        info!(email, user_id = %user.id, "Signup successful");
        Ok(user)
    }

    /// Sign out. Storage failures are logged, never returned.
    pub async fn logout(&self) {
        let _users = self.users.lock().await;

        let previous = self.current_user();
        self.publish(None);

        if let Err(e) = self.store.delete(StoreKey::CurrentUser).await {
            warn!(error = %e, "Failed to remove stored session");
        }

        let notifier = match self.notifier.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        if let Some(notifier) = notifier {
            notifier.reset_to_entry_point();
        }

        info!(email = previous.as_ref().map(|u| u.email.as_str()), "Logged out");
    }

    // =========================================================================
    // Persistence helpers
    // =========================================================================

    async fn read_json<T: DeserializeOwned>(&self, key: StoreKey) -> Result<Option<T>, AuthError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| AuthError::Corrupt { key, source })
    }

    async fn write_json<T: serde::Serialize + ?Sized>(&self, key: StoreKey, value: &T) -> Result<(), AuthError> {
        let raw = serde_json::to_string(value).map_err(|source| AuthError::Corrupt { key, source })?;
        Ok(self.store.set(key, &raw).await?)
    }

    async fn load_table(&self) -> Result<Vec<UserRecord>, AuthError> {
        Ok(self.read_json(StoreKey::UserTable).await?.unwrap_or_default())
    }

    async fn persist_current_user(&self, user: &PublicUser) -> Result<(), AuthError> {
        self.write_json(StoreKey::CurrentUser, user).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::auth::policy::Argon2Policy;
    use crate::error::{Operation, StorageError};
    use crate::models::SessionPhase;
    use crate::store::MemoryStore;

    #[derive(Default)]
    struct CountingNotifier {
        resets: AtomicUsize,
    }

    impl NavigationNotifier for CountingNotifier {
        fn reset_to_entry_point(&self) {
            self.resets.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Store whose writes always fail.
    struct ReadOnlyStore(MemoryStore);

    #[async_trait]
    impl CredentialStore for ReadOnlyStore {
        async fn get(&self, key: StoreKey) -> Result<Option<String>, StorageError> {
            self.0.get(key).await
        }

        async fn set(&self, key: StoreKey, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io {
                key,
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }

        async fn delete(&self, key: StoreKey) -> Result<(), StorageError> {
            Err(StorageError::Io {
                key,
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    /// Store whose reads fail while `fail_reads` is set.
    #[derive(Default)]
    struct UnreadableStore {
        inner: MemoryStore,
        fail_reads: AtomicBool,
    }

    #[async_trait]
    impl CredentialStore for UnreadableStore {
        async fn get(&self, key: StoreKey) -> Result<Option<String>, StorageError> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StorageError::Io {
                    key,
                    source: std::io::Error::other("disk unavailable"),
                });
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: StoreKey, value: &str) -> Result<(), StorageError> {
            self.inner.set(key, value).await
        }

        async fn delete(&self, key: StoreKey) -> Result<(), StorageError> {
            self.inner.delete(key).await
        }
    }

    fn manager(store: &MemoryStore) -> SessionManager {
        SessionManager::builder(Arc::new(store.clone()))
            .latency(Duration::ZERO)
            .build()
    }

    async fn stored_table(store: &MemoryStore) -> Vec<UserRecord> {
        let raw = store.get(StoreKey::UserTable).await.unwrap().unwrap_or_default();
        if raw.is_empty() {
            return Vec::new();
        }
        serde_json::from_str(&raw).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_empty_store() {
        let store = MemoryStore::new();
        let session = manager(&store);
        assert!(session.state().is_loading);

        let state = session.initialize().await;
        assert!(!state.is_loading);
        assert!(state.current_user.is_none());
        assert_eq!(session.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_initialize_ignores_corrupt_data() {
        let store = MemoryStore::new();
        store.set(StoreKey::CurrentUser, "{not json").await.unwrap();
        store.set(StoreKey::UserTable, "[{\"id\":1}]").await.unwrap();

        let session = manager(&store);
        let state = session.initialize().await;
        assert!(!state.is_loading);
        assert!(state.current_user.is_none());
        assert_eq!(session.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_initialize_restores_user() {
        let store = MemoryStore::new();
        store
            .set(
                StoreKey::CurrentUser,
                r#"{"id":"1","name":"Test User","email":"test@example.com"}"#,
            )
            .await
            .unwrap();

        let session = manager(&store);
        let state = session.initialize().await;
        assert_eq!(state.current_user.unwrap().email, "test@example.com");
    }

    #[tokio::test]
    async fn test_signup_then_restart_restores_user() {
        let store = MemoryStore::new();
        let session = manager(&store);
        session.initialize().await;

        let user = session.signup("A", "a@x.com", "secret1").await.unwrap();
        assert_eq!(session.current_user(), Some(user.clone()));

        let restarted = manager(&store);
        let state = restarted.initialize().await;
        assert_eq!(state.current_user.unwrap().email, "a@x.com");
        assert_eq!(restarted.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_signup_duplicate_email_rejected() {
        let store = MemoryStore::new();
        let session = manager(&store);
        session.initialize().await;
        session.signup("A", "a@x.com", "secret1").await.unwrap();

        let err = session.signup("B", "a@x.com", "secret2").await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
        assert_eq!(stored_table(&store).await.len(), 1);
    }

    #[tokio::test]
    async fn test_signup_email_match_is_case_sensitive() {
        let store = MemoryStore::new();
        let session = manager(&store);
        session.initialize().await;
        session.signup("A", "a@x.com", "secret1").await.unwrap();
        session.signup("A", "A@x.com", "secret1").await.unwrap();
        assert_eq!(stored_table(&store).await.len(), 2);
    }

    #[tokio::test]
    async fn test_login_success_sets_public_user() {
        let store = MemoryStore::new();
        store
            .set(
                StoreKey::UserTable,
                r#"[{"id":"1","name":"Test User","email":"test@example.com","secret":"password"}]"#,
            )
            .await
            .unwrap();

        let session = manager(&store);
        session.initialize().await;
        let user = session.login("test@example.com", "password").await.unwrap();
        assert_eq!(user.id, "1");
        assert_eq!(session.current_user(), Some(user));

        let persisted = store.get(StoreKey::CurrentUser).await.unwrap().unwrap();
        assert!(!persisted.contains("secret"));
        assert!(!persisted.contains("password"));
    }

    #[tokio::test]
    async fn test_login_wrong_secret_leaves_state() {
        let store = MemoryStore::new();
        let session = manager(&store);
        session.initialize().await;
        session.signup("A", "a@x.com", "secret1").await.unwrap();
        session.logout().await;

        let before = session.state();
        let err = session.login("a@x.com", "nope").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(session.state(), before);
        assert!(!store.contains(StoreKey::CurrentUser).await);
    }

    #[tokio::test]
    async fn test_login_sees_signup_from_other_instance() {
        let store = MemoryStore::new();
        let first = manager(&store);
        let second = manager(&store);
        first.initialize().await;
        second.initialize().await;

        first.signup("A", "a@x.com", "secret1").await.unwrap();
        let user = second.login("a@x.com", "secret1").await.unwrap();
        assert_eq!(user.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_signup_rereads_table_before_appending() {
        let store = MemoryStore::new();
        let first = manager(&store);
        let second = manager(&store);
        first.initialize().await;
        second.initialize().await;

        first.signup("A", "a@x.com", "secret1").await.unwrap();
        let err = second.signup("A", "a@x.com", "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));

        second.signup("B", "b@x.com", "secret2").await.unwrap();
        assert_eq!(stored_table(&store).await.len(), 2);
    }

    #[tokio::test]
    async fn test_logout_clears_and_notifies() {
        let store = MemoryStore::new();
        let notifier = Arc::new(CountingNotifier::default());
        let session = SessionManager::builder(Arc::new(store.clone()))
            .latency(Duration::ZERO)
            .notifier(notifier.clone())
            .build();
        session.initialize().await;
        session.signup("A", "a@x.com", "secret1").await.unwrap();
        assert!(store.contains(StoreKey::CurrentUser).await);

        session.logout().await;
        assert!(session.current_user().is_none());
        assert!(!store.contains(StoreKey::CurrentUser).await);
        assert_eq!(notifier.resets.load(Ordering::SeqCst), 1);

        session.set_notifier(None);
        session.logout().await;
        assert_eq!(notifier.resets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_logout_swallows_storage_errors() {
        let store = MemoryStore::new();
        store
            .set(
                StoreKey::CurrentUser,
                r#"{"id":"1","name":"Test User","email":"test@example.com"}"#,
            )
            .await
            .unwrap();
        let session = SessionManager::builder(Arc::new(ReadOnlyStore(store)))
            .latency(Duration::ZERO)
            .build();
        assert!(session.initialize().await.is_authenticated());

        session.logout().await;
        assert!(session.current_user().is_none());
    }

    #[tokio::test]
    async fn test_signup_storage_failure_is_reported() {
        let session = SessionManager::builder(Arc::new(ReadOnlyStore(MemoryStore::new())))
            .latency(Duration::ZERO)
            .build();
        session.initialize().await;

        let err = session.signup("A", "a@x.com", "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::Storage(_)));
        assert!(!session.state().is_authenticated());
        assert_eq!(session.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_signups_are_not_lost() {
        let store = MemoryStore::new();
        let session = Arc::new(manager(&store));
        session.initialize().await;

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let session = Arc::clone(&session);
                tokio::spawn(async move {
                    session
                        .signup("User", &format!("user{}@x.com", i), "secret1")
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(stored_table(&store).await.len(), 8);
        assert_eq!(session.user_count().await, 8);
    }

    #[tokio::test]
    async fn test_argon2_policy_round_trip() {
        let store = MemoryStore::new();
        let session = SessionManager::builder(Arc::new(store.clone()))
            .latency(Duration::ZERO)
            .policy(Arc::new(Argon2Policy::default()))
            .build();
        session.initialize().await;
        session.signup("A", "a@x.com", "secret1").await.unwrap();

        let table = stored_table(&store).await;
        assert_ne!(table[0].secret, "secret1");

        session.logout().await;
        assert!(session.login("a@x.com", "secret2").await.is_err());
        assert!(session.login("a@x.com", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = MemoryStore::new();
        let session = manager(&store);
        let mut rx = session.subscribe();
        assert!(rx.borrow().is_loading);

        session.initialize().await;
        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().is_loading);

        session.signup("A", "a@x.com", "secret1").await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_waits_for_latency() {
        let store = MemoryStore::new();
        let session = SessionManager::new(Arc::new(store.clone()));
        session.initialize().await;

        let start = tokio::time::Instant::now();
        let _ = session.login("nobody@x.com", "secret1").await;
        assert!(start.elapsed() >= SIMULATED_LATENCY);
    }

    #[tokio::test]
    async fn test_initialize_treats_unreadable_store_as_empty() {
        let store = Arc::new(UnreadableStore::default());
        store
            .inner
            .set(StoreKey::CurrentUser, r#"{"id":"1","name":"A","email":"a@x.com"}"#)
            .await
            .unwrap();
        store
            .inner
            .set(
                StoreKey::UserTable,
                r#"[{"id":"1","name":"A","email":"a@x.com","secret":"secret1"}]"#,
            )
            .await
            .unwrap();
        store.fail_reads.store(true, Ordering::SeqCst);

        let session = SessionManager::builder(store).latency(Duration::ZERO).build();
        let state = session.initialize().await;
        assert_eq!(state.phase(), SessionPhase::ReadyUnauthenticated);
        assert_eq!(session.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_login_read_failure_is_generic_and_keeps_state() {
        let store = Arc::new(UnreadableStore::default());
        let session = SessionManager::builder(store.clone())
            .latency(Duration::ZERO)
            .build();
        session.initialize().await;
        let user = session.signup("A", "a@x.com", "secret1").await.unwrap();

        store.fail_reads.store(true, Ordering::SeqCst);
        let err = session.login("a@x.com", "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::Storage(StorageError::Io { .. })));
        assert!(!err.is_domain());
        assert_eq!(
            err.user_message(Operation::Login),
            "An error occurred during login"
        );

        let state = session.state();
        assert_eq!(state.current_user, Some(user));
        assert!(!state.is_loading);
    }
}
