//! fanout - sequential vs parallel fan-out over simulated network calls.
//!
//! Exit codes:
//!   0 - Success (partial results included)
//!   1 - Invalid arguments or configuration, or a failed combined fetch

mod aggregate;
mod api;
mod app;
mod cli;
mod config;
mod error;
mod export;
mod join;
mod models;
mod ui;

use anyhow::Result;
use app::App;
use cli::{Args, RunMode};
use config::Config;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if args.print_config {
        print!("{}", config::sample_config());
        return Ok(());
    }

    // Logging would garble the alternate screen, so only batch runs get it.
    if args.batch {
        init_logging(&args);
    }
    debug!("Arguments: {:?}", args);

    let mut config = if let Some(ref path) = args.config {
        Config::load(path)?
    } else {
        Config::load_or_default()
    };
    config.merge_with_args(&args);

    let mut app = App::new(&args, &config)?;

    if app.batch_mode {
        let failed = run_batch(&mut app).await?;
        if failed {
            std::process::exit(1);
        }
        Ok(())
    } else {
        run_interactive(&mut app).await
    }
}

/// Initialize logging on stderr so stdout only carries results.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to install logger: {}", e);
    }
}

/// Run in batch mode. Returns true when any iteration failed outright.
async fn run_batch(app: &mut App) -> Result<bool> {
    info!(user_id = app.user_id, mode = %app.mode, "Batch run");
    let mode = app.mode;

    loop {
        app.run(mode).await;
        ui::render_batch(app)?;

        if app.should_quit() {
            break;
        }
    }

    Ok(app.failed_runs > 0)
}

/// Run in interactive mode with TUI.
async fn run_interactive(app: &mut App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Main application loop.
async fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if let Some(mode) = handle_key_event(app, key.code, key.modifiers) {
                    // Show the loading state before the run blocks the loop.
                    app.begin(mode);
                    terminal.draw(|f| ui::render(f, app))?;
                    app.run(mode).await;
                }
            }
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

/// Handle keyboard input. Returns a strategy to run, if one was requested.
fn handle_key_event(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Option<RunMode> {
    // Close help overlay on any key
    if app.show_help {
        app.show_help = false;
        return None;
    }

    match code {
        // Quit
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // Strategies
        KeyCode::Char('s') => return Some(RunMode::Sequential),
        KeyCode::Char('p') => return Some(RunMode::Parallel),
        KeyCode::Char('c') => return Some(RunMode::Combined),
        KeyCode::Char(' ') | KeyCode::Char('R') => return Some(app.mode),

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(),
        KeyCode::Home | KeyCode::Char('g') => app.scroll_top(),
        KeyCode::PageUp => {
            for _ in 0..10 {
                app.scroll_up();
            }
        }
        KeyCode::PageDown => {
            for _ in 0..10 {
                app.scroll_down();
            }
        }

        KeyCode::Char('h') | KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }

    None
}
