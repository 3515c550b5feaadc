//! Presentation layer handling terminal UI and user input.
//!
//! This module renders the options form and preview using ratatui and
//! translates crossterm key events into application actions.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
