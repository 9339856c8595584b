//! Status bar widget.

use crate::ui::theme::{Palette, Styles};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};

/// A key hint for the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHint {
    pub key: &'static str,
    pub label: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// Status bar displayed at the bottom of the screen.
///
/// Left side: mode badge and key hints. Right side: a notice (or the
/// backend label when there is nothing to report).
#[derive(Debug, Clone)]
pub struct StatusBar<'a> {
    mode: &'a str,
    hints: Vec<KeyHint>,
    right_text: Option<&'a str>,
    right_style: Style,
}

impl<'a> StatusBar<'a> {
    /// Create a new status bar.
    pub fn new(mode: &'a str) -> Self {
        Self {
            mode,
            hints: Vec::new(),
            right_text: None,
            right_style: Styles::status_bar(),
        }
    }

    /// Add key hints.
    #[must_use]
    pub fn hints(mut self, hints: Vec<KeyHint>) -> Self {
        self.hints = hints;
        self
    }

    /// Set right-aligned text.
    #[must_use]
    pub fn right(mut self, text: &'a str) -> Self {
        self.right_text = Some(text);
        self
    }

    /// Render the right-aligned text as a notice.
    #[must_use]
    pub fn notice(mut self, text: &'a str) -> Self {
        self.right_text = Some(text);
        self.right_style = Styles::status_bar().fg(Palette::WARNING);
        self
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        for x in area.x..area.x.saturating_add(area.width) {
            buf[(x, area.y)].set_char(' ').set_bg(Palette::STATUS_BG);
        }

        let mut spans = vec![
            Span::styled(
                format!(" {} ", self.mode),
                Styles::default().bg(Palette::ACCENT).fg(Palette::BG),
            ),
            Span::styled(" ", Styles::status_bar()),
        ];
        for hint in &self.hints {
            spans.push(Span::styled(format!(" {} ", hint.key), Styles::key_hint()));
            spans.push(Span::styled(format!(" {} ", hint.label), Styles::key_label()));
        }

        let left = Line::from(spans);
        let left_width = u16::try_from(left.width()).unwrap_or(u16::MAX);
        buf.set_line(area.x, area.y, &left, area.width);

        if let Some(text) = self.right_text {
            let text_width = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
            // Only draw when it fits beside the hints.
            if text_width.saturating_add(left_width).saturating_add(1) < area.width {
                let x = area.x + area.width - text_width - 1;
                buf.set_string(x, area.y, text, self.right_style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;

    #[test]
    fn test_status_bar_renders_hints_and_right_text() {
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new("AskMOS")
            .hints(vec![KeyHint::new("Enter", "Send")])
            .right("demo")
            .render(area, &mut buf);

        let line = buffer_to_string(&buf);
        assert!(line.starts_with(" AskMOS "));
        assert!(line.contains("Enter"));
        assert!(line.contains("Send"));
        assert!(line.trim_end().ends_with("demo"));
    }

    #[test]
    fn test_status_bar_drops_right_text_that_does_not_fit() {
        let area = Rect::new(0, 0, 24, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new("AskMOS")
            .hints(vec![KeyHint::new("Enter", "Send")])
            .notice("a very long notification")
            .render(area, &mut buf);

        assert!(!buffer_to_string(&buf).contains("notification"));
    }
}
