//! Application state for the askmos TUI.

use crate::event::{key_to_action, mouse_to_action, Action};
use crate::panes::conversation::TranscriptView;
use crate::render::RenderReport;
use crate::ui::TextInputState;
use askmos_engine::{
    Config, ConversationSession, GraphPanel, LoadCompletion, LoadRequest, LoadTicket,
    QueryCompletion, QueryTicket, Submission,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};

/// Ticks a notification stays visible.
const NOTIFICATION_TICKS: usize = 40;

/// Lines moved by a page scroll.
const PAGE_LINES: usize = 10;

/// Which pane receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Conversation,
    Graph,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Self::Conversation => Self::Graph,
            Self::Graph => Self::Conversation,
        }
    }
}

/// Work the event loop must start on behalf of the app.
#[derive(Debug)]
pub enum Command {
    /// Send a question to the query service.
    Ask(QueryTicket),
    /// Ask the graph service for the knowledge graph.
    LoadGraph(LoadTicket),
}

/// Main application state.
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Whether help overlay is visible.
    pub show_help: bool,

    /// Focused pane.
    pub focus: Focus,

    /// Conversation with the assistant.
    pub session: ConversationSession,

    /// Knowledge graph panel.
    pub panel: GraphPanel,

    /// Question being typed.
    pub input: TextInputState,

    /// Scroll position of the transcript.
    pub transcript_view: TranscriptView,

    /// Tick counter for animations.
    pub tick: usize,

    /// Where answers come from, shown in the status bar.
    pub backend_label: String,

    /// Transient notification message.
    notification: Option<String>,
    notification_ticks: usize,
}

impl App {
    /// Create a new app from configuration.
    pub fn new(config: &Config, backend_label: impl Into<String>) -> Self {
        let session = ConversationSession::from_config(config);
        let mut transcript_view = TranscriptView::default();
        transcript_view.sync(session.revision());
        Self {
            should_quit: false,
            show_help: false,
            focus: Focus::default(),
            session,
            panel: GraphPanel::new(),
            input: TextInputState::new(),
            transcript_view,
            tick: 0,
            backend_label: backend_label.into(),
            notification: None,
            notification_ticks: 0,
        }
    }

    /// Current notification, if any.
    pub fn notification(&self) -> Option<&str> {
        self.notification.as_deref()
    }

    /// Show a transient notification.
    pub fn notify(&mut self, message: impl Into<String>) {
        self.notification = Some(message.into());
        self.notification_ticks = NOTIFICATION_TICKS;
    }

    /// Advance animations and expire notifications.
    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        if self.notification_ticks > 0 {
            self.notification_ticks -= 1;
            if self.notification_ticks == 0 {
                self.notification = None;
            }
        }
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if self.show_help {
            self.show_help = false;
            return None;
        }
        if self.focus == Focus::Conversation && self.edit_input(key) {
            return None;
        }
        self.handle_action(key_to_action(key, self.focus))
    }

    /// Handle a mouse event.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<Command> {
        self.handle_action(mouse_to_action(mouse))
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) -> Option<Command> {
        if self.show_help && action != Action::None {
            self.show_help = false;
            return None;
        }

        match action {
            Action::Quit => self.should_quit = true,
            Action::Help => self.show_help = true,
            Action::Back => self.notification = None,
            Action::Send => return self.send_input(),
            Action::LoadGraph => return self.request_graph(),
            Action::CopyArtifact => self.copy_artifact(),
            Action::FocusNext => self.focus = self.focus.next(),
            Action::ScrollUp => self.transcript_view.scroll_up(1),
            Action::ScrollDown => self.transcript_view.scroll_down(1),
            Action::PageUp => self.transcript_view.scroll_up(PAGE_LINES),
            Action::PageDown => self.transcript_view.scroll_down(PAGE_LINES),
            Action::ScrollLatest => self.transcript_view.jump_to_latest(),
            Action::None => {}
        }
        None
    }

    /// Submit the input line. The input is cleared only when the question
    /// was accepted.
    pub fn send_input(&mut self) -> Option<Command> {
        match self.session.submit(self.input.content()) {
            Submission::Sent(ticket) => {
                self.input.submit();
                self.transcript_view.sync(self.session.revision());
                Some(Command::Ask(ticket))
            }
            Submission::Empty => None,
            Submission::Busy => {
                self.notify("Still waiting for the previous answer");
                None
            }
        }
    }

    /// Start loading the knowledge graph.
    pub fn request_graph(&mut self) -> Option<Command> {
        match self.panel.request_load() {
            LoadRequest::Started(ticket) => Some(Command::LoadGraph(ticket)),
            LoadRequest::AlreadyLoading => None,
            LoadRequest::AlreadyReady => {
                self.notify("Knowledge graph already loaded");
                None
            }
        }
    }

    /// Apply a finished question.
    pub fn finish_query(&mut self, completion: QueryCompletion) {
        if self.session.complete(completion).is_none() {
            return;
        }
        self.transcript_view.sync(self.session.revision());
        if let Some(error) = self.session.last_failure() {
            let message = format!("Query failed: {error}");
            self.notify(message);
        }
    }

    /// Apply a finished graph load.
    pub fn finish_graph(&mut self, completion: LoadCompletion) {
        if self.panel.complete(completion) {
            if let Some(error) = self.panel.error() {
                let message = format!("Graph unavailable: {error}");
                self.notify(message);
            }
        }
    }

    /// Feed back what the last frame drew.
    pub fn after_render(&mut self, report: RenderReport) {
        self.transcript_view.clamp(report.transcript_max_offset);
        if let Some(artifact) = report.shown_artifact {
            if !self.panel.is_rendered() {
                self.panel.artifact_rendered(&artifact);
            }
        }
    }

    /// Copy the graph locator to the system clipboard.
    pub fn copy_artifact(&mut self) {
        let Some(locator) = self.panel.artifact().map(|a| a.locator.clone()) else {
            self.notify("No knowledge graph to copy yet");
            return;
        };
        let copied =
            arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(locator));
        match copied {
            Ok(()) => self.notify("Graph link copied"),
            Err(e) => {
                tracing::warn!(error = %e, "clipboard unavailable");
                self.notify(format!("Copy failed: {e}"));
            }
        }
    }

    /// Apply an editing key to the input line. Returns whether it was used.
    fn edit_input(&mut self, key: KeyEvent) -> bool {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return false;
        }
        match key.code {
            KeyCode::Char(c) => self.input.insert(c),
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            KeyCode::Up => self.input.history_prev(),
            KeyCode::Down => self.input.history_next(),
            _ => return false,
        }
        true
    }
}
