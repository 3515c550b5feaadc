//! qrform - Terminal QR Code Styling
//!
//! A terminal form for styling QR codes: every control is bound to a path in
//! a nested options document, and a preview renderer follows each change.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing_subscriber::EnvFilter;

use qrform::application::{App, AppMode};
use qrform::infrastructure::{AppConfig, OptionsRepository};
use qrform::presentation::{render_ui, InputHandler};

/// Entry point for the qrform terminal application.
///
/// Reads configuration from the environment, starts file logging, builds
/// the bound form and runs the main event loop until the user quits. An
/// optional first argument names an options file to load at startup.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened, the form cannot be
/// bound, or terminal setup fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();
    init_logging(&config.log_file)?;

    let mut app = App::new(&config)?;
    if let Some(filename) = std::env::args().nth(1) {
        let result = OptionsRepository::load_options(Path::new(&filename))
            .map(|options| (options, filename))
            .map_err(|e| e.to_string());
        app.set_load_result(result);
    }
    tracing::info!(export_dir = %config.export_dir.display(), "qrform started");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(%err, "terminal loop failed");
        println!("{err:?}");
    }

    Ok(())
}

/// Sends `tracing` output to `path` so it does not draw over the UI.
///
/// The level comes from `RUST_LOG` and defaults to `info`.
fn init_logging(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

/// Main application event loop.
///
/// Handles terminal rendering and keyboard input processing.
/// Continues running until the user presses 'q' in normal mode.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') if matches!(app.mode, AppMode::Normal) => return Ok(()),
                    _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
                }
            }
        }
    }
}
