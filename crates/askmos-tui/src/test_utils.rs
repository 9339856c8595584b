//! Test utilities for askmos-tui rendering tests.

use crate::app::App;
use askmos_engine::Config;
use ratatui::{backend::TestBackend, Terminal};

pub use crate::headless::buffer_to_string;

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 80;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 24;

/// Create a test terminal with custom dimensions.
pub fn create_test_terminal_sized(width: u16, height: u16) -> Terminal<TestBackend> {
    let backend = TestBackend::new(width, height);
    Terminal::new(backend).expect("Failed to create test terminal")
}

/// Create a test app with default configuration.
pub fn create_test_app() -> App {
    App::new(&Config::default(), "test backend")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render;
    use ratatui::buffer::Buffer;

    #[test]
    fn test_create_test_terminal() {
        let terminal = create_test_terminal_sized(TEST_WIDTH, TEST_HEIGHT);
        let size = terminal.size().unwrap();
        assert_eq!(size.width, TEST_WIDTH);
        assert_eq!(size.height, TEST_HEIGHT);
    }

    #[test]
    fn test_draw_through_terminal() {
        let mut terminal = create_test_terminal_sized(TEST_WIDTH, TEST_HEIGHT);
        let app = create_test_app();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render(&app, area, frame.buffer_mut());
            })
            .unwrap();

        let screen = buffer_to_string(terminal.backend().buffer());
        assert!(screen.contains("Welcome to MOSDAC!"));
    }

    #[test]
    fn test_buffer_to_string() {
        let area = ratatui::layout::Rect::new(0, 0, 10, 2);
        let mut buffer = Buffer::empty(area);
        buffer.set_string(0, 0, "INSAT", ratatui::style::Style::default());
        buffer.set_string(0, 1, "3DR", ratatui::style::Style::default());

        insta::assert_snapshot!(buffer_to_string(&buffer), @r"
        INSAT
        3DR
        ");
    }
}
