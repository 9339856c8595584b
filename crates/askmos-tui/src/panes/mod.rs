//! The panes making up the askmos screen.

pub mod conversation;
pub mod graph;
pub mod help;
