//! UI module for the askmos TUI.

pub mod layout;
pub mod theme;
pub mod widgets;

pub use layout::*;
pub use widgets::*;
