//! Single-line question input.

use crate::ui::theme::Styles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

/// Input line widget, rendered from a [`TextInputState`].
#[derive(Debug, Clone)]
pub struct TextInput<'a> {
    content: &'a str,
    /// Cursor position (character index).
    cursor: usize,
    focused: bool,
    placeholder: Option<&'a str>,
    prompt: &'a str,
}

impl<'a> TextInput<'a> {
    /// Set focus state.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Set placeholder text.
    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }
}

impl Widget for TextInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 1 {
            return;
        }

        let mut spans = vec![Span::styled(self.prompt, Styles::active())];

        if self.content.is_empty() {
            if self.focused {
                spans.push(Span::styled("_", Styles::active()));
            }
            if let Some(placeholder) = self.placeholder {
                spans.push(Span::styled(placeholder, Styles::dim()));
            }
        } else {
            let split = byte_index(self.content, self.cursor);
            let (before, after) = self.content.split_at(split);
            spans.push(Span::styled(before, Styles::default()));
            if self.focused {
                spans.push(Span::styled(
                    if after.is_empty() { "_" } else { "|" },
                    Styles::active(),
                ));
            }
            spans.push(Span::styled(after, Styles::default()));
        }

        Paragraph::new(Line::from(spans))
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

/// State for the question input: content, cursor and submitted history.
#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    content: String,
    /// Cursor position (character index).
    cursor: usize,
    history: Vec<String>,
    /// Position in history counted back from the newest entry.
    history_index: Option<usize>,
    /// Draft saved while browsing history.
    saved_input: String,
}

impl TextInputState {
    /// Create a new empty text input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Cursor position as a character index.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Check if the content is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Clear the content.
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Insert a character at the cursor position.
    pub fn insert(&mut self, ch: char) {
        let at = byte_index(&self.content, self.cursor);
        self.content.insert(at, ch);
        self.cursor += 1;
    }

    /// Insert a string at the cursor position.
    pub fn insert_str(&mut self, s: &str) {
        let at = byte_index(&self.content, self.cursor);
        self.content.insert_str(at, s);
        self.cursor += s.chars().count();
    }

    /// Delete the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = byte_index(&self.content, self.cursor);
            self.content.remove(at);
        }
    }

    /// Delete the character at the cursor (delete).
    pub fn delete(&mut self) {
        if self.cursor < self.len() {
            let at = byte_index(&self.content, self.cursor);
            self.content.remove(at);
        }
    }

    /// Move cursor left.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn move_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    /// Move cursor to start.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Move cursor to end.
    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }

    /// Record the content in history and clear it.
    pub fn submit(&mut self) -> String {
        let content = std::mem::take(&mut self.content);
        self.cursor = 0;
        if !content.trim().is_empty() && self.history.last() != Some(&content) {
            self.history.push(content.clone());
        }
        self.history_index = None;
        self.saved_input.clear();
        content
    }

    /// Navigate to previous history entry.
    pub fn history_prev(&mut self) {
        let next = match self.history_index {
            None => 0,
            Some(index) => index + 1,
        };
        if next >= self.history.len() {
            return;
        }
        if self.history_index.is_none() {
            self.saved_input = self.content.clone();
        }
        self.history_index = Some(next);
        self.set_content(self.history[self.history.len() - 1 - next].clone());
    }

    /// Navigate to next history entry, restoring the draft past the newest.
    pub fn history_next(&mut self) {
        match self.history_index {
            None => {}
            Some(0) => {
                self.history_index = None;
                let draft = std::mem::take(&mut self.saved_input);
                self.set_content(draft);
            }
            Some(index) => {
                self.history_index = Some(index - 1);
                self.set_content(self.history[self.history.len() - index].clone());
            }
        }
    }

    /// Create a widget from this state.
    pub fn widget(&self) -> TextInput<'_> {
        TextInput {
            content: &self.content,
            cursor: self.cursor,
            focused: true,
            placeholder: None,
            prompt: "> ",
        }
    }

    fn set_content(&mut self, content: String) {
        self.content = content;
        self.cursor = self.len();
    }

    fn len(&self) -> usize {
        self.content.chars().count()
    }
}

fn byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices().nth(char_index).map_or(s.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;

    #[test]
    fn test_text_input_state_basic() {
        let mut state = TextInputState::new();
        assert!(state.is_empty());

        state.insert('H');
        state.insert('i');
        assert_eq!(state.content(), "Hi");
        assert_eq!(state.cursor(), 2);

        state.backspace();
        assert_eq!(state.content(), "H");

        state.clear();
        assert!(state.is_empty());
    }

    #[test]
    fn test_text_input_state_cursor_movement() {
        let mut state = TextInputState::new();
        state.insert_str("INSAT");

        state.move_left();
        state.move_left();
        assert_eq!(state.cursor(), 3);

        state.insert('-');
        assert_eq!(state.content(), "INS-AT");

        state.move_home();
        state.delete();
        assert_eq!(state.content(), "NS-AT");

        state.move_end();
        assert_eq!(state.cursor(), 5);
    }

    #[test]
    fn test_text_input_handles_multibyte_chars() {
        let mut state = TextInputState::new();
        state.insert_str("°C ");
        state.move_home();
        state.move_right();
        state.insert('5');
        assert_eq!(state.content(), "°5C ");

        state.backspace();
        state.backspace();
        assert_eq!(state.content(), "C ");
    }

    #[test]
    fn test_text_input_state_history() {
        let mut state = TextInputState::new();

        state.insert_str("first");
        state.submit();
        assert!(state.is_empty());

        state.insert_str("second");
        state.submit();

        state.insert_str("draft");
        state.history_prev();
        assert_eq!(state.content(), "second");

        state.history_prev();
        assert_eq!(state.content(), "first");

        // Past the oldest entry stays put.
        state.history_prev();
        assert_eq!(state.content(), "first");

        state.history_next();
        assert_eq!(state.content(), "second");

        state.history_next();
        assert_eq!(state.content(), "draft");
    }

    #[test]
    fn test_blank_submissions_are_not_remembered() {
        let mut state = TextInputState::new();
        state.insert_str("   ");
        state.submit();
        state.history_prev();
        assert!(state.is_empty());
    }

    #[test]
    fn test_widget_shows_placeholder_when_empty() {
        let state = TextInputState::new();
        let area = Rect::new(0, 0, 30, 1);
        let mut buf = Buffer::empty(area);
        state
            .widget()
            .placeholder("Ask about satellite data")
            .render(area, &mut buf);

        insta::assert_snapshot!(buffer_to_string(&buf).trim_end(), @"> _Ask about satellite data");
    }

    #[test]
    fn test_widget_draws_cursor_mid_text() {
        let mut state = TextInputState::new();
        state.insert_str("MOSDAC");
        state.move_left();
        let area = Rect::new(0, 0, 20, 1);
        let mut buf = Buffer::empty(area);
        state.widget().render(area, &mut buf);

        insta::assert_snapshot!(buffer_to_string(&buf).trim_end(), @"> MOSDA|C");
    }
}
