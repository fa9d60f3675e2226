//! A terminal dialog with an optional title, a body, a cancel/submit footer,
//! submit-on-Enter and focus placed inside the dialog on mount.

pub mod app;
pub mod cli;
pub mod config;
pub mod theme;
pub mod tui;
pub mod ui;

pub use theme::Theme;

/// Product name, shown when a dialog asks for the default title.
pub const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");
