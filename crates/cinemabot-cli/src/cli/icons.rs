//! Console output icons.

use console::{style, StyledObject};

/// Reply marker (cyan →).
pub fn info() -> StyledObject<&'static str> {
    style("→").cyan()
}

/// Error icon (red ✗).
pub fn error() -> StyledObject<&'static str> {
    style("✗").red()
}

/// Prompt shown before each chat line.
pub fn prompt() -> StyledObject<&'static str> {
    style(">").bold()
}
