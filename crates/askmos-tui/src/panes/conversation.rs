//! Conversation pane: transcript, typing indicator and input line.

use crate::app::{App, Focus};
use crate::ui::theme::{Styles, Symbols};
use askmos_engine::{ConversationSession, Turn};
use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Scroll state of the transcript, measured in lines above the bottom.
///
/// Any change to the session's revision pins the view to the latest turn.
#[derive(Debug, Clone, Default)]
pub struct TranscriptView {
    offset_from_bottom: usize,
    /// Largest useful offset, known after the first frame.
    max_offset: Option<usize>,
    seen_revision: Option<u64>,
}

impl TranscriptView {
    /// Follow the session. Returns `true` when the revision moved and the
    /// view jumped to the latest turn.
    pub fn sync(&mut self, revision: u64) -> bool {
        if self.seen_revision == Some(revision) {
            return false;
        }
        self.seen_revision = Some(revision);
        self.offset_from_bottom = 0;
        true
    }

    pub fn scroll_up(&mut self, lines: usize) {
        let offset = self.offset_from_bottom.saturating_add(lines);
        self.offset_from_bottom = match self.max_offset {
            Some(max) => offset.min(max),
            None => offset,
        };
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.offset_from_bottom = self.offset_from_bottom.saturating_sub(lines);
    }

    pub fn jump_to_latest(&mut self) {
        self.offset_from_bottom = 0;
    }

    /// Record the largest offset the last frame allowed.
    pub fn clamp(&mut self, max_offset: usize) {
        self.max_offset = Some(max_offset);
        self.offset_from_bottom = self.offset_from_bottom.min(max_offset);
    }

    pub fn is_at_latest(&self) -> bool {
        self.offset_from_bottom == 0
    }

    pub fn offset(&self) -> usize {
        self.offset_from_bottom
    }

    /// First visible line for `total` lines shown in `height` rows.
    pub fn top_line(&self, total: usize, height: usize) -> usize {
        let max = total.saturating_sub(height);
        max - self.offset_from_bottom.min(max)
    }
}

/// Build the transcript as display lines wrapped to `width`.
pub fn transcript_lines(
    session: &ConversationSession,
    tick: usize,
    width: usize,
) -> Vec<Line<'static>> {
    let body_width = width.saturating_sub(2).max(1);
    let mut lines = Vec::new();

    for turn in session.turns() {
        lines.push(turn_header(turn));
        for row in textwrap::wrap(&turn.body, body_width) {
            lines.push(Line::from(Span::styled(format!("  {row}"), Styles::default())));
        }
        lines.push(Line::default());
    }

    if session.awaiting_response() {
        let dots = Symbols::TYPING[(tick / 2) % Symbols::TYPING.len()];
        lines.push(Line::from(vec![
            Span::styled("AskMOS", Styles::graph().add_modifier(Modifier::BOLD)),
            Span::styled(format!(" is typing{dots}"), Styles::dim()),
        ]));
    }

    lines
}

fn turn_header(turn: &Turn) -> Line<'static> {
    let (label, style) = if turn.is_user() {
        ("You", Styles::highlight())
    } else {
        ("AskMOS", Styles::graph().add_modifier(Modifier::BOLD))
    };
    let time = turn.created_at.with_timezone(&Local).format("%H:%M");
    Line::from(vec![
        Span::styled(label, style),
        Span::styled(format!("  {time}"), Styles::dim()),
    ])
}

/// Render the conversation pane. Returns the largest scroll offset the
/// transcript allows at this size.
pub fn render(app: &App, area: Rect, buf: &mut Buffer) -> usize {
    let focused = app.focus == Focus::Conversation;
    let block = Block::default()
        .title(" Satellite Data Assistant ")
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border_active(focused))
        .style(Styles::default());
    let inner = block.inner(area);
    block.render(area, buf);

    if inner.height < 3 || inner.width < 4 {
        return 0;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(2),
        ])
        .split(inner);

    let max_offset = render_transcript(app, chunks[0], buf);

    let divider = "─".repeat(usize::from(chunks[1].width));
    buf.set_string(chunks[1].x, chunks[1].y, divider, Styles::border());

    let placeholder = if app.session.awaiting_response() {
        "Waiting for the answer..."
    } else {
        "Ask about satellite data, missions or products"
    };
    app.input
        .widget()
        .focused(focused)
        .placeholder(placeholder)
        .render(chunks[2], buf);

    max_offset
}

fn render_transcript(app: &App, area: Rect, buf: &mut Buffer) -> usize {
    let lines = transcript_lines(&app.session, app.tick, usize::from(area.width));
    let height = usize::from(area.height);
    let total = lines.len();
    let top = app.transcript_view.top_line(total, height);

    Paragraph::new(lines)
        .style(Styles::default())
        .scroll((u16::try_from(top).unwrap_or(u16::MAX), 0))
        .render(area, buf);

    if !app.transcript_view.is_at_latest() && area.width > 12 {
        let hint = " more below ";
        let x = area.x + area.width - 12;
        buf.set_string(x, area.y + area.height - 1, hint, Styles::warning());
    }

    total.saturating_sub(height)
}
