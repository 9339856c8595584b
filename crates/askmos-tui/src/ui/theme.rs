//! Theme and styling definitions for the askmos TUI.

use ratatui::style::{Color, Modifier, Style};

/// Color palette for the TUI.
pub struct Palette;

impl Palette {
    // Base colors
    pub const BG: Color = Color::Rgb(15, 23, 42);
    pub const FG: Color = Color::Rgb(226, 232, 240);
    pub const DIM: Color = Color::Rgb(148, 163, 184);

    // Conversation accent (cyan) and graph accent (purple)
    pub const ACCENT: Color = Color::Rgb(34, 211, 238);
    pub const GRAPH: Color = Color::Rgb(192, 132, 252);

    // Status bar colors (high contrast)
    pub const STATUS_BG: Color = Color::Rgb(30, 41, 59);
    pub const STATUS_KEY_BG: Color = Color::Rgb(14, 116, 144);

    // Status colors
    pub const SUCCESS: Color = Color::Rgb(134, 239, 172);
    pub const WARNING: Color = Color::Rgb(253, 224, 71);
    pub const ERROR: Color = Color::Rgb(248, 113, 113);

    // Border colors
    pub const BORDER: Color = Color::Rgb(51, 65, 85);
    pub const BORDER_ACTIVE: Color = Color::Rgb(34, 211, 238);
}

/// Status indicator symbols (with ASCII fallbacks).
pub struct Symbols;

impl Symbols {
    pub const ERROR: &'static str = "[x]";
    pub const READY: &'static str = "[ok]";
    pub const SPINNER: [&'static str; 4] = ["|", "/", "-", "\\"];
    pub const TYPING: [&'static str; 4] = [".  ", ".. ", "...", " .."];
}

/// Common styles used throughout the TUI.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::BG)
    }

    /// Dimmed text for secondary information.
    pub fn dim() -> Style {
        Style::default().fg(Palette::DIM).bg(Palette::BG)
    }

    /// Highlighted/selected item.
    pub fn highlight() -> Style {
        Style::default()
            .fg(Palette::ACCENT)
            .bg(Palette::BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Active/focused element.
    pub fn active() -> Style {
        Style::default().fg(Palette::ACCENT).bg(Palette::BG)
    }

    /// Graph pane accent.
    pub fn graph() -> Style {
        Style::default().fg(Palette::GRAPH).bg(Palette::BG)
    }

    /// Success status.
    pub fn success() -> Style {
        Style::default().fg(Palette::SUCCESS).bg(Palette::BG)
    }

    /// Warning status.
    pub fn warning() -> Style {
        Style::default().fg(Palette::WARNING).bg(Palette::BG)
    }

    /// Error status.
    pub fn error() -> Style {
        Style::default().fg(Palette::ERROR).bg(Palette::BG)
    }

    /// Title style.
    pub fn title() -> Style {
        Style::default()
            .fg(Palette::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint style (for status bar) - bright on dark for visibility.
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Palette::FG)
            .bg(Palette::STATUS_KEY_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint label style - readable on status bar background.
    pub fn key_label() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Status bar background style.
    pub fn status_bar() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Border style for inactive elements.
    pub fn border() -> Style {
        Style::default().fg(Palette::BORDER)
    }

    /// Border style for the focused pane.
    pub fn border_active(focused: bool) -> Style {
        if focused {
            Style::default().fg(Palette::BORDER_ACTIVE)
        } else {
            Self::border()
        }
    }
}
