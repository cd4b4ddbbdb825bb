//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod ask;
mod chat;
mod config_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cinemabot::config::Settings;

#[derive(Parser)]
#[command(name = "cinemabot")]
#[command(about = "Look up movies and TV shows on TMDB, IMDB and Kinopoisk")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Proxy URL for all outgoing requests (overrides PROXY)
    #[arg(long, global = true)]
    proxy: Option<String>,

    /// TMDB API key (overrides TMDB_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single message and exit
    Ask {
        /// Message text, e.g. "Inception" or "#kp Титаник"
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Interactive chat session on stdin
    Chat,

    /// Print the effective configuration (secrets masked)
    Config,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())
        .await?
        .with_cli_overrides(cli.api_key, cli.proxy);

    match cli.command {
        Commands::Config => config_cmd::cmd_config_show(&settings),
        Commands::Ask { message } => {
            settings.validate()?;
            ask::cmd_ask(&settings, &message.join(" ")).await
        }
        Commands::Chat => {
            settings.validate()?;
            chat::cmd_chat(&settings).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_joins_words() {
        let cli = Cli::try_parse_from(["cinemabot", "ask", "#kp", "Титаник"]).unwrap();
        match cli.command {
            Commands::Ask { message } => assert_eq!(message.join(" "), "#kp Титаник"),
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cinemabot",
            "chat",
            "--verbose",
            "--proxy",
            "socks5://127.0.0.1:9050",
            "--api-key",
            "abc",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.proxy.as_deref(), Some("socks5://127.0.0.1:9050"));
        assert_eq!(cli.api_key.as_deref(), Some("abc"));
        assert!(matches!(cli.command, Commands::Chat));
    }

    #[test]
    fn test_ask_requires_message() {
        assert!(Cli::try_parse_from(["cinemabot", "ask"]).is_err());
    }
}
