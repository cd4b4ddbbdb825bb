//! Configuration display command.

use console::style;

use cinemabot::config::Settings;

use crate::cli::icons::error;

/// Print the effective settings with secrets masked.
pub fn cmd_config_show(settings: &Settings) -> anyhow::Result<()> {
    print!("{}", settings.redacted().to_toml()?);

    if let Err(e) = settings.validate() {
        eprintln!("{} {}", error(), style(e).yellow());
    }
    Ok(())
}
