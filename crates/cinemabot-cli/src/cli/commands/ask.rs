//! One-shot lookup command.

use console::style;

use cinemabot::config::Settings;
use cinemabot::lookup::{OutboundMessage, Orchestrator, Reply};

use crate::cli::icons::info;

/// Answer a single message and print the reply.
pub async fn cmd_ask(settings: &Settings, message: &str) -> anyhow::Result<()> {
    let reply = Orchestrator::new(settings).handle(message).await;
    print_reply(&reply);
    Ok(())
}

/// Print every outbound message in delivery order.
pub fn print_reply(reply: &Reply) {
    for message in &reply.messages {
        match message {
            OutboundMessage::Text(text) => println!("{} {}", info(), text.trim_end()),
            OutboundMessage::Photo(url) => println!("{} {} {}", info(), style("Poster:").bold(), url),
        }
    }
}
