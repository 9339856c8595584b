//! askmos-tui: Terminal UI for the askmos satellite data assistant
//!
//! This crate provides the TUI layer for askmos, including:
//! - Conversation pane with auto-scrolling transcript and input line
//! - Knowledge graph pane driven by the panel loader
//! - Background task runner for questions and graph loads
//! - Headless mode for testing and automation

mod app;
mod event;
pub mod headless;
mod panes;
mod render;
mod tasks;
#[cfg(test)]
pub mod test_utils;
mod ui;

pub use app::{App, Command, Focus};
pub use askmos_engine;
pub use event::{Action, Event, EventHandler};
pub use render::RenderReport;
pub use tasks::{Services, Tasks};

use askmos_engine::Config;
use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};

/// Event loop tick rate.
const TICK_RATE_MS: u64 = 100;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Run the TUI application.
///
/// Sets up the terminal, runs the event loop until the user quits, and
/// restores the terminal on exit. `backend_label` is shown in the status
/// bar.
pub async fn run_tui(
    config: &Config,
    services: Services,
    backend_label: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, backend_label);
    let mut events = EventHandler::new(TICK_RATE_MS);

    tracing::info!(session = app.session.id(), "tui started");
    let result = run_loop(&mut terminal, &mut app, &mut events, &services).await;
    tracing::info!(turns = app.session.turns().len(), "tui stopped");

    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
    services: &Services,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut tasks = Tasks::default();

    loop {
        tasks.collect(app).await;

        let mut report = RenderReport::default();
        terminal.draw(|frame| {
            let area = frame.area();
            report = render::render(app, area, frame.buffer_mut());
        })?;
        app.after_render(report);

        if app.should_quit {
            break;
        }

        let command = match events.next().await {
            Some(Event::Key(key)) => app.handle_key(key),
            Some(Event::Mouse(mouse)) => app.handle_mouse(mouse),
            Some(Event::Tick) => {
                app.on_tick();
                None
            }
            Some(Event::Resize(..)) => None,
            None => break,
        };

        if let Some(command) = command {
            tasks.dispatch(command, services);
        }
    }

    tasks.abort_all();
    Ok(())
}
