//! Application state management for the sessionkit front-end.
//!
//! This module contains the `App` struct that holds the navigation stack,
//! form state for the login and signup screens, and the channel that
//! background session tasks report back on.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use sessionkit_core::auth::validation::{
    self, FieldError, MAX_EMAIL_LENGTH, MAX_NAME_LENGTH, MAX_SECRET_LENGTH,
};
use sessionkit_core::{
    AuthError, Config, CredentialStore, NavigationNotifier, Operation, PublicUser, SessionManager,
    SessionState,
};

use crate::navigation::{Navigator, Route};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// Session tasks are user-triggered, so a handful in flight is the most we see.
const CHANNEL_BUFFER_SIZE: usize = 16;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ConfirmingQuit,
    Quitting,
}

/// Welcome screen button focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WelcomeFocus {
    SignIn,
    SignUp,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Secret,
    Button,
    SignupLink,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Secret,
            LoginFocus::Secret => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::SignupLink,
            LoginFocus::SignupLink => LoginFocus::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::SignupLink,
            LoginFocus::Secret => LoginFocus::Email,
            LoginFocus::Button => LoginFocus::Secret,
            LoginFocus::SignupLink => LoginFocus::Button,
        }
    }
}

/// Signup form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupFocus {
    Name,
    Email,
    Secret,
    Confirm,
    Button,
    LoginLink,
}

impl SignupFocus {
    pub fn next(&self) -> Self {
        match self {
            SignupFocus::Name => SignupFocus::Email,
            SignupFocus::Email => SignupFocus::Secret,
            SignupFocus::Secret => SignupFocus::Confirm,
            SignupFocus::Confirm => SignupFocus::Button,
            SignupFocus::Button => SignupFocus::LoginLink,
            SignupFocus::LoginLink => SignupFocus::Name,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            SignupFocus::Name => SignupFocus::LoginLink,
            SignupFocus::Email => SignupFocus::Name,
            SignupFocus::Secret => SignupFocus::Email,
            SignupFocus::Confirm => SignupFocus::Secret,
            SignupFocus::Button => SignupFocus::Confirm,
            SignupFocus::LoginLink => SignupFocus::Button,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub secret: String,
    pub focus: LoginFocus,
    pub field_errors: Vec<FieldError>,
    pub error: Option<String>,
    pub submitting: bool,
    pub show_secret: bool,
}

impl LoginForm {
    fn new(email: Option<String>) -> Self {
        let email = email.unwrap_or_default();
        let focus = if email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Secret
        };
        Self {
            email,
            secret: String::new(),
            focus,
            field_errors: Vec::new(),
            error: None,
            submitting: false,
            show_secret: false,
        }
    }

    /// Append a typed character to the focused field.
    pub fn push_char(&mut self, c: char) {
        let (field, max) = match self.focus {
            LoginFocus::Email => (&mut self.email, MAX_EMAIL_LENGTH),
            LoginFocus::Secret => (&mut self.secret, MAX_SECRET_LENGTH),
            LoginFocus::Button | LoginFocus::SignupLink => return,
        };
        if validation::can_add_field_char(field.chars().count(), max, c) {
            field.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        match self.focus {
            LoginFocus::Email => {
                self.email.pop();
            }
            LoginFocus::Secret => {
                self.secret.pop();
            }
            LoginFocus::Button | LoginFocus::SignupLink => {}
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub secret: String,
    pub confirm: String,
    pub focus: SignupFocus,
    pub field_errors: Vec<FieldError>,
    pub error: Option<String>,
    pub submitting: bool,
    pub show_secret: bool,
}

impl Default for SignupForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            secret: String::new(),
            confirm: String::new(),
            focus: SignupFocus::Name,
            field_errors: Vec::new(),
            error: None,
            submitting: false,
            show_secret: false,
        }
    }
}

impl SignupForm {
    pub fn push_char(&mut self, c: char) {
        let (field, max) = match self.focus {
            SignupFocus::Name => (&mut self.name, MAX_NAME_LENGTH),
            SignupFocus::Email => (&mut self.email, MAX_EMAIL_LENGTH),
            SignupFocus::Secret => (&mut self.secret, MAX_SECRET_LENGTH),
            SignupFocus::Confirm => (&mut self.confirm, MAX_SECRET_LENGTH),
            SignupFocus::Button | SignupFocus::LoginLink => return,
        };
        if validation::can_add_field_char(field.chars().count(), max, c) {
            field.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        let field = match self.focus {
            SignupFocus::Name => &mut self.name,
            SignupFocus::Email => &mut self.email,
            SignupFocus::Secret => &mut self.secret,
            SignupFocus::Confirm => &mut self.confirm,
            SignupFocus::Button | SignupFocus::LoginLink => return,
        };
        field.pop();
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Messages sent from spawned session tasks back to the main loop.
#[derive(Debug)]
pub enum TaskResult {
    /// The stored session finished loading
    Initialized(SessionState),
    /// A login attempt completed
    LoginFinished(Result<PublicUser, AuthError>),
    /// A signup attempt completed
    SignupFinished(Result<PublicUser, AuthError>),
    /// Logout completed and the stored session is gone
    LoggedOut,
    /// The session asked for the signed-out entry point
    ResetToEntryPoint,
}

/// Forwards logout navigation requests from the session manager into the
/// task channel.
struct ChannelNotifier {
    tx: mpsc::Sender<TaskResult>,
}

impl NavigationNotifier for ChannelNotifier {
    fn reset_to_entry_point(&self) {
        if let Err(e) = self.tx.try_send(TaskResult::ResetToEntryPoint) {
            warn!(error = %e, "Failed to deliver navigation reset");
        }
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    pub config: Config,
    /// Where `config` is saved; `None` keeps it in memory only
    config_path: Option<PathBuf>,
    pub session: Arc<SessionManager>,

    // UI State
    pub state: AppState,
    pub navigator: Navigator,
    pub session_state: SessionState,
    pub welcome_focus: WelcomeFocus,
    pub login: LoginForm,
    pub signup: SignupForm,
    pub home_selection: usize,
    pub spinner_tick: usize,
    pub status_message: Option<String>,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,
}

impl App {
    /// Create the application over the store selected in `config`.
    pub fn new(config: Config) -> Result<Self> {
        let store = config.open_store()?;
        let config_path = match Config::config_path() {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "Config will not be saved");
                None
            }
        };
        Ok(Self::from_parts(config, store, config_path))
    }

    pub fn from_parts(
        config: Config,
        store: Arc<dyn CredentialStore>,
        config_path: Option<PathBuf>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let notifier = Arc::new(ChannelNotifier { tx: tx.clone() });
        let session = SessionManager::builder(store)
            .policy(config.secret_policy.build())
            .latency(config.latency())
            .notifier(notifier)
            .build();
        debug!(
            backend = ?config.backend,
            policy = ?config.secret_policy,
            latency_ms = config.latency_ms,
            "Session manager configured"
        );

        let login = LoginForm::new(config.last_email.clone());

        Self {
            config,
            config_path,
            session_state: session.state(),
            session: Arc::new(session),

            state: AppState::Normal,
            navigator: Navigator::default(),
            welcome_focus: WelcomeFocus::SignIn,
            login,
            signup: SignupForm::default(),
            home_selection: 0,
            spinner_tick: 0,
            status_message: None,

            task_rx: rx,
            task_tx: tx,
        }
    }

    pub fn current_route(&self) -> Route {
        self.navigator.current()
    }

    pub fn current_user(&self) -> Option<&PublicUser> {
        self.session_state.current_user.as_ref()
    }

    // =========================================================================
    // Session tasks
    // =========================================================================

    /// Load the stored session in the background.
    pub fn start_initialize(&self) {
        let session = Arc::clone(&self.session);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let state = session.initialize().await;
            Self::send_result(&tx, TaskResult::Initialized(state)).await;
        });
    }

    /// Validate the login form and, if it passes, sign in in the background.
    pub fn submit_login(&mut self) {
        if self.login.submitting {
            return;
        }
        self.login.error = None;
        if let Err(errors) = validation::validate_login(&self.login.email, &self.login.secret) {
            self.login.field_errors = errors;
            return;
        }
        self.login.field_errors.clear();
        self.login.submitting = true;

        let session = Arc::clone(&self.session);
        let tx = self.task_tx.clone();
        let email = self.login.email.clone();
        let secret = self.login.secret.clone();
        tokio::spawn(async move {
            let result = session.login(&email, &secret).await;
            Self::send_result(&tx, TaskResult::LoginFinished(result)).await;
        });
    }

    /// Validate the signup form and, if it passes, register in the background.
    pub fn submit_signup(&mut self) {
        if self.signup.submitting {
            return;
        }
        self.signup.error = None;
        let form = &self.signup;
        if let Err(errors) =
            validation::validate_signup(&form.name, &form.email, &form.secret, &form.confirm)
        {
            self.signup.field_errors = errors;
            return;
        }
        self.signup.field_errors.clear();
        self.signup.submitting = true;

        let session = Arc::clone(&self.session);
        let tx = self.task_tx.clone();
        let name = self.signup.name.trim().to_string();
        let email = self.signup.email.clone();
        let secret = self.signup.secret.clone();
        tokio::spawn(async move {
            let result = session.signup(&name, &email, &secret).await;
            Self::send_result(&tx, TaskResult::SignupFinished(result)).await;
        });
    }

    pub fn start_logout(&mut self) {
        self.status_message = Some("Signing out...".to_string());
        let session = Arc::clone(&self.session);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            session.logout().await;
            Self::send_result(&tx, TaskResult::LoggedOut).await;
        });
    }

    async fn send_result(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if let Err(e) = tx.send(result).await {
            warn!(error = %e, "Failed to send task result - channel closed");
        }
    }

    /// Drain finished background tasks without blocking.
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.task_rx.try_recv() {
            self.handle_task_result(result);
        }
    }

    /// Wait for the next background task result and apply it.
    #[cfg(test)]
    pub async fn next_task_result(&mut self) {
        if let Some(result) = self.task_rx.recv().await {
            self.handle_task_result(result);
        }
    }

    fn handle_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Initialized(state) => {
                let route = if state.is_authenticated() {
                    Route::Home
                } else {
                    Route::Welcome
                };
                info!(?route, "Session loaded");
                self.navigator.reset(route);
            }
            TaskResult::LoginFinished(result) => {
                self.login.submitting = false;
                match result {
                    Ok(user) => {
                        self.login.secret.clear();
                        self.remember_email(&user.email);
                        self.enter_home();
                    }
                    Err(e) => {
                        debug!(error = %e, "Login failed");
                        self.login.error = Some(e.user_message(Operation::Login));
                    }
                }
            }
            TaskResult::SignupFinished(result) => {
                self.signup.submitting = false;
                match result {
                    Ok(user) => {
                        self.signup = SignupForm::default();
                        self.remember_email(&user.email);
                        self.enter_home();
                    }
                    Err(e) => {
                        debug!(error = %e, "Signup failed");
                        self.signup.error = Some(e.user_message(Operation::Signup));
                    }
                }
            }
            TaskResult::ResetToEntryPoint => {
                self.login = LoginForm::new(self.config.last_email.clone());
                self.navigator.reset(Route::Login);
            }
            TaskResult::LoggedOut => {
                self.status_message = Some("Signed out".to_string());
                // The notifier's reset can be dropped on a full channel
                if self.current_route() == Route::Home {
                    self.login = LoginForm::new(self.config.last_email.clone());
                    self.navigator.reset(Route::Login);
                }
            }
        }
        self.session_state = self.session.state();
    }

    fn enter_home(&mut self) {
        self.home_selection = 0;
        self.status_message = None;
        self.navigator.reset(Route::Home);
    }

    fn remember_email(&mut self, email: &str) {
        if self.config.last_email.as_deref() == Some(email) {
            return;
        }
        self.config.last_email = Some(email.to_string());
        if let Some(ref path) = self.config_path {
            if let Err(e) = self.config.save_to(path) {
                warn!(error = %e, "Failed to save config");
            }
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn open_login(&mut self) {
        if self.login.email.is_empty() {
            if let Some(ref email) = self.config.last_email {
                self.login.email = email.clone();
            }
        }
        self.login.focus = if self.login.email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Secret
        };
        self.login.error = None;
        self.login.field_errors.clear();
        self.navigate(Route::Login);
    }

    pub fn open_signup(&mut self) {
        self.signup.error = None;
        self.signup.field_errors.clear();
        self.signup.focus = SignupFocus::Name;
        self.navigate(Route::Signup);
    }

    fn navigate(&mut self, route: Route) {
        self.navigator.push(route);
        debug!(?route, depth = self.navigator.depth(), "Navigated");
    }

    /// Go back one screen, or ask to quit when already at the root.
    pub fn go_back(&mut self) {
        if !self.navigator.pop() {
            self.state = AppState::ConfirmingQuit;
        }
    }

    pub fn tick(&mut self) {
        self.spinner_tick = self.spinner_tick.wrapping_add(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
