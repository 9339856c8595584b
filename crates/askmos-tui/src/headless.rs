//! Headless mode for the askmos TUI.
//!
//! Runs the full event loop against a `TestBackend` so end-to-end flows can
//! be driven without a terminal. Input is sent over a channel and the
//! rendered screen is published after every frame.

use crate::app::App;
use crate::event::Action;
use crate::render::{self, RenderReport};
use crate::tasks::{Services, Tasks};
use askmos_engine::{Config, PanelStatus};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Default terminal dimensions for headless mode.
pub const DEFAULT_WIDTH: u16 = 100;
pub const DEFAULT_HEIGHT: u16 = 30;

/// Input accepted by a headless TUI.
#[derive(Debug, Clone)]
pub enum HeadlessInput {
    Key(KeyEvent),
    Action(Action),
}

/// State captured from the headless TUI after each render.
#[derive(Debug, Clone, Default)]
pub struct HeadlessState {
    /// Text contents of the terminal buffer.
    pub screen_contents: String,
    /// Whether the TUI should quit.
    pub should_quit: bool,
    /// Whether help overlay is visible.
    pub show_help: bool,
    /// Number of turns in the transcript.
    pub turn_count: usize,
    /// Whether a question is in flight.
    pub awaiting_response: bool,
    /// Graph panel status.
    pub panel_status: PanelStatus,
    /// Whether the shown graph has been rendered.
    pub graph_rendered: bool,
    /// Notification in the status bar.
    pub notification: Option<String>,
}

/// Handle to control a headless TUI instance.
pub struct HeadlessHandle {
    input_tx: mpsc::UnboundedSender<HeadlessInput>,
    state_rx: watch::Receiver<HeadlessState>,
}

impl HeadlessHandle {
    /// Send an action. Returns `true` if it was delivered.
    pub fn send_action(&self, action: Action) -> bool {
        self.input_tx.send(HeadlessInput::Action(action)).is_ok()
    }

    /// Send a key press.
    pub fn send_key(&self, key: KeyEvent) -> bool {
        self.input_tx.send(HeadlessInput::Key(key)).is_ok()
    }

    /// Press a key without modifiers.
    pub fn press(&self, code: KeyCode) -> bool {
        self.send_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    /// Press a key with Ctrl held.
    pub fn ctrl(&self, c: char) -> bool {
        self.send_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    /// Type text one key at a time.
    pub fn type_text(&self, text: &str) -> bool {
        text.chars().all(|c| self.press(KeyCode::Char(c)))
    }

    /// Get the current state of the TUI.
    pub fn state(&self) -> HeadlessState {
        self.state_rx.borrow().clone()
    }

    /// Wait until a condition is met on the state.
    ///
    /// Returns the state when the condition is met, or `None` if timed out.
    pub async fn wait_for<F>(&mut self, condition: F, timeout: Duration) -> Option<HeadlessState>
    where
        F: Fn(&HeadlessState) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let state = self.state();
            if condition(&state) {
                return Some(state);
            }

            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return None;
            }

            match tokio::time::timeout(remaining, self.state_rx.changed()).await {
                Ok(Ok(())) => {}
                // Timed out, or the loop exited.
                _ => return None,
            }
        }
    }

    /// Wait for specific text to appear on screen.
    pub async fn wait_for_text(&mut self, text: &str, timeout: Duration) -> Option<HeadlessState> {
        self.wait_for(|s| s.screen_contents.contains(text), timeout)
            .await
    }

    /// Check if the TUI has quit.
    pub fn has_quit(&self) -> bool {
        self.state().should_quit
    }
}

/// Configuration for headless mode.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Terminal width.
    pub width: u16,
    /// Terminal height.
    pub height: u16,
    /// Tick rate in milliseconds.
    pub tick_rate_ms: u64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tick_rate_ms: 20,
        }
    }
}

/// Run the TUI in headless mode.
///
/// Returns a handle to control the TUI and a join handle for the loop.
///
/// # Example
///
/// ```ignore
/// let (mut handle, task) = run_tui_headless(&config, services, HeadlessConfig::default());
/// handle.type_text("What is MOSDAC?");
/// handle.press(KeyCode::Enter);
/// handle.wait_for(|s| s.turn_count == 3, Duration::from_secs(2)).await;
/// handle.ctrl('c');
/// task.await.unwrap();
/// ```
pub fn run_tui_headless(
    config: &Config,
    services: Services,
    headless: HeadlessConfig,
) -> (HeadlessHandle, JoinHandle<Result<(), String>>) {
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(HeadlessState::default());

    let app = App::new(config, "headless");

    let task = tokio::spawn(async move {
        run_headless_loop(app, services, headless, input_rx, state_tx)
            .await
            .map_err(|e| e.to_string())
    });

    (HeadlessHandle { input_tx, state_rx }, task)
}

async fn run_headless_loop(
    mut app: App,
    services: Services,
    headless: HeadlessConfig,
    mut input_rx: mpsc::UnboundedReceiver<HeadlessInput>,
    state_tx: watch::Sender<HeadlessState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let backend = TestBackend::new(headless.width, headless.height);
    let mut terminal = Terminal::new(backend)?;
    let mut tasks = Tasks::default();
    let tick = Duration::from_millis(headless.tick_rate_ms);

    loop {
        tasks.collect(&mut app).await;

        let mut report = RenderReport::default();
        terminal.draw(|frame| {
            let area = frame.area();
            report = render::render(&app, area, frame.buffer_mut());
        })?;
        app.after_render(report);

        let _ = state_tx.send(HeadlessState {
            screen_contents: buffer_to_string(terminal.backend().buffer()),
            should_quit: app.should_quit,
            show_help: app.show_help,
            turn_count: app.session.turns().len(),
            awaiting_response: app.session.awaiting_response(),
            panel_status: app.panel.status(),
            graph_rendered: app.panel.is_rendered(),
            notification: app.notification().map(str::to_string),
        });

        if app.should_quit {
            break;
        }

        let input = tokio::select! {
            Some(input) = input_rx.recv() => Some(input),
            () = tokio::time::sleep(tick) => None,
        };

        let command = match input {
            Some(HeadlessInput::Key(key)) => app.handle_key(key),
            Some(HeadlessInput::Action(action)) => app.handle_action(action),
            None => {
                app.on_tick();
                None
            }
        };
        if let Some(command) = command {
            tasks.dispatch(command, &services);
        }
    }

    tasks.abort_all();
    Ok(())
}

/// Convert a buffer to text, one row per line with trailing spaces trimmed.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                result.push_str(cell.symbol());
            }
        }
        while result.ends_with(' ') {
            result.pop();
        }
        result.push('\n');
    }

    if result.ends_with('\n') {
        result.pop();
    }

    result
}
