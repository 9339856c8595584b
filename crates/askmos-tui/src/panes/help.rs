//! Help overlay.

use crate::ui::centered_fixed;
use crate::ui::theme::Styles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

const HELP_TEXT: &str = r"
  Conversation
    Enter             Send question
    Up / Down         Previous / next question
    PgUp / PgDn       Scroll transcript
    Ctrl+L            Jump to latest answer

  Knowledge graph
    Ctrl+G            Load the graph
    Ctrl+Y            Copy the graph link

  Tab                 Switch pane
  Ctrl+C              Quit

  [Press any key to close]
";

/// Render the help overlay centered in `area`.
pub fn render_help_overlay(area: Rect, buf: &mut Buffer) {
    let width = 52.min(area.width.saturating_sub(4));
    let height = 19.min(area.height.saturating_sub(2));
    let overlay_area = centered_fixed(width, height, area);

    Clear.render(overlay_area, buf);

    let block = Block::default()
        .title(" Help ")
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border_active(true))
        .style(Styles::default());

    Paragraph::new(HELP_TEXT)
        .block(block)
        .style(Styles::default())
        .render(overlay_area, buf);
}
