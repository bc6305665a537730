mod app;
mod config;
mod db;
mod error;
mod logging;
mod models;
mod ui;
mod worker;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::app::AppState;
use crate::models::RecordKind;
use crate::worker::Worker;

/// Manage taqueria employees and clients
#[derive(Parser, Debug)]
#[command(name = "taqueria", version, about)]
struct Cli {
    /// Properties file with DATABASE_URL, DATABASE_USER and DATABASE_PASSWORD
    /// (defaults to ./db.properties when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// File that receives log output while the UI owns the terminal
    #[arg(long, value_name = "FILE", default_value = "taqueria.log")]
    log_file: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long)]
    debug: bool,

    /// List shown first
    #[arg(long, value_enum, default_value_t = StartScreen::Employees)]
    start: StartScreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StartScreen {
    Employees,
    Clients,
}

impl From<StartScreen> for RecordKind {
    fn from(screen: StartScreen) -> Self {
        match screen {
            StartScreen::Employees => RecordKind::Employee,
            StartScreen::Clients => RecordKind::Client,
        }
    }
}

// How often the UI loop checks for finished background jobs
const TICK: Duration = Duration::from_millis(100);

// Upper bound on waiting for in-flight writes at exit
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_file, cli.debug)?;

    // Load configuration
    let config = config::init(cli.config.as_deref())?;
    println!("Connecting to the database...");

    // Initialize database connection
    let db = db::init(&config).await?;
    println!("Database connection established");

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state and queue the first read of both tables
    let mut app_state = AppState::new(Worker::new(db.clone()), cli.start.into());
    app_state.load_all();

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    app_state.finish(SHUTDOWN_GRACE).await;
    db.close().await;

    // Show any error message
    if let Err(err) = result {
        tracing::error!(error = %err, "application stopped with an error");
        println!("Error: {}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        // Marshal finished database jobs back onto the UI loop
        app_state.drain_outcomes();

        terminal.draw(|f| app_state.render(f))?;

        if app_state.should_quit() {
            break;
        }

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Release {
                    app_state.handle_key(key);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["taqueria"]);
        assert_eq!(cli.config, None);
        assert_eq!(cli.log_file, PathBuf::from("taqueria.log"));
        assert!(!cli.debug);
        assert_eq!(RecordKind::from(cli.start), RecordKind::Employee);
    }

    #[test]
    fn cli_accepts_overrides() {
        let cli = Cli::parse_from([
            "taqueria",
            "--config",
            "conf/db.properties",
            "--start",
            "clients",
            "--debug",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("conf/db.properties")));
        assert_eq!(RecordKind::from(cli.start), RecordKind::Client);
        assert!(cli.debug);
    }
}
