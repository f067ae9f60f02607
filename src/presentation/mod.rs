//! Presentation layer handling terminal UI and user input.
//!
//! This module renders the wizard screens and popups using ratatui and maps
//! key presses onto application actions.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
