//! sessionkit - a terminal front-end for a local mock authentication session.
//!
//! Shows a welcome screen, login and signup forms, and a signed-in home
//! screen. Accounts and the current session are kept in the configured
//! credential store, so a signed-in user stays signed in across restarts.

mod app;
mod navigation;
mod ui;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sessionkit_core::{Config, SessionManager};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Rolling log file prefix inside the log directory
const LOG_FILE_PREFIX: &str = "sessionkit.log";

const USAGE: &str = "\
Usage: sessionkit [OPTIONS]

Options:
  --data-dir <PATH>  Store accounts and the session under PATH
  --whoami           Print the signed-in user and exit
  --logout           Clear the stored session and exit
  --help             Print this help

Environment:
  SESSIONKIT_DATA_DIR, SESSIONKIT_LATENCY_MS, SESSIONKIT_SECRET_POLICY,
  SESSIONKIT_BACKEND, SESSIONKIT_EMAIL, RUST_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    WhoAmI,
    Logout,
    Help,
}

#[derive(Debug)]
struct Args {
    command: Command,
    data_dir: Option<PathBuf>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args {
        command: Command::Run,
        data_dir: None,
    };
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data-dir" => {
                let dir = args.next().context("--data-dir needs a path")?;
                parsed.data_dir = Some(PathBuf::from(dir));
            }
            "--whoami" => parsed.command = Command::WhoAmI,
            "--logout" => parsed.command = Command::Logout,
            "--help" | "-h" => parsed.command = Command::Help,
            other => bail!("unknown argument: {}\n\n{}", other, USAGE),
        }
    }
    Ok(parsed)
}

/// Initialize the tracing subscriber for logging.
///
/// The terminal belongs to the UI, so logs go to a daily rolling file.
/// Use the RUST_LOG env var to control the level (e.g. RUST_LOG=debug).
fn init_tracing(log_dir: &Path) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(log_dir)
        .with_context(|| format!("Failed to open log directory {}", log_dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    Ok(guard)
}

fn load_config(data_dir: Option<PathBuf>) -> Config {
    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: using default config: {:#}", e);
            Config::default()
        }
    };
    config.apply_env();
    if let Some(dir) = data_dir {
        config.data_dir = Some(dir);
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = parse_args(std::env::args().skip(1))?;
    if args.command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = load_config(args.data_dir);
    let _guard = match init_tracing(&config.data_dir().join("logs")) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {:#}", e);
            None
        }
    };
    info!(command = ?args.command, "sessionkit starting");

    match args.command {
        Command::WhoAmI => return whoami(&config).await,
        Command::Logout => return logout(&config).await,
        Command::Run | Command::Help => {}
    }

    let mut app = App::new(config)?;
    app.start_initialize();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("sessionkit shutting down");
    Ok(())
}

/// Print the persisted current user.
async fn whoami(config: &Config) -> Result<()> {
    let session = SessionManager::new(config.open_store()?);
    match session.initialize().await.current_user {
        Some(user) => println!("{} <{}>", user.name, user.email),
        None => println!("Not signed in"),
    }
    Ok(())
}

/// Clear the persisted session without starting the UI.
async fn logout(config: &Config) -> Result<()> {
    let session = SessionManager::new(config.open_store()?);
    let was_signed_in = session.initialize().await.is_authenticated();
    session.logout().await;
    if was_signed_in {
        println!("Signed out");
    } else {
        println!("Not signed in");
    }
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        app.tick();

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
