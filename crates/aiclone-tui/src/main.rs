//! AI Clone - a terminal front end for the AI Clone content studio.
//!
//! Sign in, check your credit balance and manage your session from the
//! terminal. The session is kept on disk so it survives restarts.

mod app;
mod ui;
mod utils;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use aiclone_core::{Config, SessionStore};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name inside the storage directory
const LOG_FILE: &str = "aiclone.log";

const USAGE: &str = "\
Usage: aiclone [COMMAND]

Without a command, starts the terminal UI.

Commands:
  --whoami             Print the stored session as JSON
  --set-credits <N>    Replace the credit balance of the stored session
  --logout             Clear the stored session
  --help               Show this message";

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to a file; the terminal belongs to the UI while it runs.
fn init_file_tracing(dir: &Path) -> WorkerGuard {
    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    guard
}

/// Log to stderr for one-shot commands.
fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

fn report_config_error(err: Option<anyhow::Error>) {
    if let Some(e) = err {
        warn!(error = %format!("{:#}", e), "Failed to load config, using defaults");
    }
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Nothing is listening for log events yet; hold the error until tracing is up
    let (config, config_err) = Config::load_or_default();
    let storage_dir = config.storage_dir()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Some(command) = args.first() {
        init_stderr_tracing();
        report_config_error(config_err);
        let store = SessionStore::open_dir(&storage_dir);
        return run_command(&store, command, &args[1..]);
    }

    std::fs::create_dir_all(&storage_dir)
        .with_context(|| format!("Failed to create {}", storage_dir.display()))?;
    if let Some(e) = &config_err {
        // Surface it on the terminal too, before raw mode hides stderr
        eprintln!("Warning: {:#}. Using default settings.", e);
    }
    let _log_guard = init_file_tracing(&storage_dir);
    report_config_error(config_err);
    info!(dir = %storage_dir.display(), "AI Clone starting");

    // Created once here, torn down when main returns
    let store = SessionStore::open_dir(&storage_dir);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, &store);

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("AI Clone shutting down");
    Ok(())
}

/// One-shot maintenance commands against the stored session.
fn run_command(store: &SessionStore, command: &str, rest: &[String]) -> Result<()> {
    match command {
        "--whoami" => {
            match store.current() {
                Some(session) => println!("{}", serde_json::to_string_pretty(&session)?),
                None => eprintln!("Not signed in"),
            }
            Ok(())
        }
        "--set-credits" => {
            let raw = rest
                .first()
                .ok_or_else(|| anyhow::anyhow!("--set-credits needs a value"))?;
            let credits: u64 = raw
                .parse()
                .with_context(|| format!("Invalid credit balance: {}", raw))?;
            if !store.is_authenticated() {
                anyhow::bail!("Not signed in; no credit balance to update");
            }
            store.update_credits(credits);
            eprintln!("Credits set to {}", credits);
            Ok(())
        }
        "--logout" => {
            store.logout();
            eprintln!("Logged out");
            Ok(())
        }
        "--help" | "-h" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => {
            eprintln!("{}", USAGE);
            anyhow::bail!("Unknown command: {}", other)
        }
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Observe the store and settle navigation before drawing
        app.tick();

        // Draw UI
        terminal.draw(|f| render(f, app))?;

        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
