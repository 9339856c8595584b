//! Frame rendering.

use crate::app::{App, Focus};
use crate::panes::{conversation, graph, help};
use crate::ui::{main_layout, pane_layout, KeyHint, StatusBar};
use askmos_engine::ArtifactRef;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

/// What a frame drew that the app needs to know about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Largest transcript scroll offset at the current size.
    pub transcript_max_offset: usize,
    /// Graph artifact shown in the graph pane.
    pub shown_artifact: Option<ArtifactRef>,
}

const CONVERSATION_HINTS: [KeyHint; 4] = [
    KeyHint::new("Enter", "Send"),
    KeyHint::new("^G", "Graph"),
    KeyHint::new("Tab", "Pane"),
    KeyHint::new("F1", "Help"),
];

const GRAPH_HINTS: [KeyHint; 4] = [
    KeyHint::new("Enter", "Load"),
    KeyHint::new("^Y", "Copy link"),
    KeyHint::new("Tab", "Pane"),
    KeyHint::new("q", "Quit"),
];

/// Render the whole screen.
pub fn render(app: &App, area: Rect, buf: &mut Buffer) -> RenderReport {
    let (content, status_area) = main_layout(area);
    let (left, right) = pane_layout(content);

    let transcript_max_offset = conversation::render(app, left, buf);
    let shown_artifact = graph::render(app, right, buf);

    let hints = match app.focus {
        Focus::Conversation => CONVERSATION_HINTS,
        Focus::Graph => GRAPH_HINTS,
    };
    let bar = StatusBar::new("AskMOS").hints(hints.to_vec());
    let bar = match app.notification() {
        Some(message) => bar.notice(message),
        None => bar.right(&app.backend_label),
    };
    bar.render(status_area, buf);

    if app.show_help {
        help::render_help_overlay(area, buf);
    }

    RenderReport {
        transcript_max_offset,
        shown_artifact,
    }
}
