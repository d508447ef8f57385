//! Keyboard input handling for the TUI.
//!
//! Keys are dispatched on the overlay state first, then on the current
//! route. Session operations are started here and finish in the background.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppState, LoginFocus, SignupFocus, WelcomeFocus};
use crate::navigation::Route;

use super::screens::home::FOLDERS;

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    match app.current_route() {
        Route::Layout => {}
        Route::Welcome => handle_welcome_input(app, key),
        Route::Login => handle_login_input(app, key),
        Route::Signup => handle_signup_input(app, key),
        Route::Home => handle_home_input(app, key),
    }
    false
}

fn is_reveal_toggle(key: &KeyEvent) -> bool {
    key.code == KeyCode::F(2)
        || (key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL))
}

fn handle_welcome_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
            app.welcome_focus = match app.welcome_focus {
                WelcomeFocus::SignIn => WelcomeFocus::SignUp,
                WelcomeFocus::SignUp => WelcomeFocus::SignIn,
            };
        }
        KeyCode::Enter => match app.welcome_focus {
            WelcomeFocus::SignIn => app.open_login(),
            WelcomeFocus::SignUp => app.open_signup(),
        },
        KeyCode::Char('q') | KeyCode::Esc => app.state = AppState::ConfirmingQuit,
        _ => {}
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) {
    if is_reveal_toggle(&key) {
        app.login.show_secret = !app.login.show_secret;
        return;
    }
    match key.code {
        KeyCode::Esc => app.go_back(),
        KeyCode::Down | KeyCode::Tab => app.login.focus = app.login.focus.next(),
        KeyCode::Up | KeyCode::BackTab => app.login.focus = app.login.focus.prev(),
        KeyCode::Enter => match app.login.focus {
            LoginFocus::Email => app.login.focus = LoginFocus::Secret,
            LoginFocus::Secret | LoginFocus::Button => app.submit_login(),
            LoginFocus::SignupLink => {
                // Swap rather than stack so Esc from signup returns to welcome
                app.navigator.pop();
                app.open_signup();
            }
        },
        _ if app.login.submitting => {}
        KeyCode::Backspace => app.login.pop_char(),
        KeyCode::Char(c) => app.login.push_char(c),
        _ => {}
    }
}

fn handle_signup_input(app: &mut App, key: KeyEvent) {
    if is_reveal_toggle(&key) {
        app.signup.show_secret = !app.signup.show_secret;
        return;
    }
    match key.code {
        KeyCode::Esc => app.go_back(),
        KeyCode::Down | KeyCode::Tab => app.signup.focus = app.signup.focus.next(),
        KeyCode::Up | KeyCode::BackTab => app.signup.focus = app.signup.focus.prev(),
        KeyCode::Enter => match app.signup.focus {
            SignupFocus::Confirm | SignupFocus::Button => app.submit_signup(),
            SignupFocus::LoginLink => {
                app.navigator.pop();
                app.open_login();
            }
            focus => app.signup.focus = focus.next(),
        },
        _ if app.signup.submitting => {}
        KeyCode::Backspace => app.signup.pop_char(),
        KeyCode::Char(c) => app.signup.push_char(c),
        _ => {}
    }
}

fn handle_home_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.home_selection = app.home_selection.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.home_selection + 1 < FOLDERS.len() {
                app.home_selection += 1;
            }
        }
        KeyCode::Char('l') => app.start_logout(),
        KeyCode::Char('q') | KeyCode::Esc => app.state = AppState::ConfirmingQuit,
        _ => {}
    }
}
