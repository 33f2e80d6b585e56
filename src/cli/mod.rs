//! Command-line surface: argument parsing and the interactive shop menu.

mod args;
mod menu;

pub use args::Cli;
pub use menu::{Menu, MenuChoice};
