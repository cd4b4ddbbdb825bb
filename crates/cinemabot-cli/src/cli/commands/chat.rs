//! Interactive chat session over stdin/stdout.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use cinemabot::config::Settings;
use cinemabot::lookup::Orchestrator;

use super::ask::print_reply;
use crate::cli::icons::prompt;

const WELCOME_TEXT: &str = "Hi!\nI'm CinemaBot!\nWrite the name of a film or TV show and I'll find it for you.";

const HELP_TEXT: &str = "Write the name of a film or TV show to search TMDB.\n\
                         Other sources:\n\
                         #kp *film name* - search Kinopoisk\n\
                         #im *film name* - search IMDB\n\
                         /quit - leave the chat";

/// What to do with one line of input.
#[derive(Debug, PartialEq, Eq)]
enum ChatCommand<'a> {
    Start,
    Help,
    Quit,
    Skip,
    Lookup(&'a str),
}

fn classify(line: &str) -> ChatCommand<'_> {
    match line.trim() {
        "" => ChatCommand::Skip,
        "/start" => ChatCommand::Start,
        "/help" => ChatCommand::Help,
        "/quit" | "/exit" => ChatCommand::Quit,
        text => ChatCommand::Lookup(text),
    }
}

/// Answer messages from stdin until `/quit` or EOF, one lookup at a time.
pub async fn cmd_chat(settings: &Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", WELCOME_TEXT);
    loop {
        print!("{} ", prompt());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            debug!("stdin closed, ending chat");
            break;
        };

        match classify(&line) {
            ChatCommand::Start => println!("{}", WELCOME_TEXT),
            ChatCommand::Help => println!("{}", HELP_TEXT),
            ChatCommand::Quit => break,
            ChatCommand::Skip => {}
            ChatCommand::Lookup(text) => {
                let reply = orchestrator.handle(text).await;
                print_reply(&reply);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("/start"), ChatCommand::Start);
        assert_eq!(classify(" /help \n"), ChatCommand::Help);
        assert_eq!(classify("/quit"), ChatCommand::Quit);
        assert_eq!(classify("   "), ChatCommand::Skip);
        assert_eq!(classify("#kp Титаник"), ChatCommand::Lookup("#kp Титаник"));
    }
}
