//! Loan Wizard - Terminal Loan Application
//!
//! Collects personal data, address and workplace, and loan parameters over
//! three screens, keeping every entered value in a local JSON store, and
//! submits the application to a remote endpoint.

use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};

use loan_wizard::application::{ApiEvent, App, AppMode};
use loan_wizard::config::{Cli, Config};
use loan_wizard::infrastructure::{FileStore, HttpLoanApi, RequestWorker};
use loan_wizard::logging;
use loan_wizard::presentation::{InputHandler, render_ui};

/// How long to wait for a key before checking for finished requests.
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Entry point for the loan wizard.
///
/// Parses the configuration, sets up logging and the terminal, and runs the
/// event loop until the user quits.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or terminal setup fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_cli(Cli::parse());
    logging::init(config.verbose, &config.log_file);
    tracing::info!(store = %config.store_path.display(), route = config.start_route.path(), "Starting loan wizard");

    let api = HttpLoanApi::new(&config.api)?;
    let (events_tx, events_rx) = mpsc::channel();
    let worker = RequestWorker::new(Arc::new(api), events_tx);

    let store = FileStore::open(&config.store_path);
    let mut app = App::new(Box::new(store), config.start_route);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &worker, &events_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "Terminal error");
        println!("{err:?}");
    }

    tracing::info!("Exiting loan wizard");
    Ok(())
}

/// Main application event loop.
///
/// Dispatches queued requests, applies finished ones, redraws, and handles
/// key presses. Returns when the user presses `q` or Esc in normal mode.
///
/// # Errors
///
/// Returns an IO error if terminal operations fail.
fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    worker: &RequestWorker,
    events: &Receiver<ApiEvent>,
) -> io::Result<()> {
    loop {
        for request in app.take_requests() {
            worker.dispatch(request);
        }
        while let Ok(event) = events.try_recv() {
            app.handle_api_event(event);
        }

        terminal.draw(|f| render_ui(f, app))?;

        if !event::poll(EVENT_POLL_INTERVAL)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc if app.mode == AppMode::Normal => return Ok(()),
                    _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
                }
            }
        }
    }
}
