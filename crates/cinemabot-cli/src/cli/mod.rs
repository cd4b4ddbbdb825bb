//! Command-line interface for cinemabot.

mod commands;
pub mod icons;

pub use commands::{is_verbose, run};
