//! Lookup orchestration: one chat message in, an ordered reply out.

use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::http_client::{Fetcher, HttpClient};
use crate::models::{LookupOutcome, MovieRecord, SourceQuery, SourceTag};
use crate::sources::create_source;
use crate::watch_link::WatchLinkResolver;

pub const NOT_FOUND_MESSAGE: &str = "Please write the correct Film or TV show name";
pub const NOT_FOUND_TAGGED_MESSAGE: &str = "Please write the correct Film or TV show name or change source";
pub const BLOCKED_MESSAGE: &str = "Kinopoisk has blocked the request, please try again later or change source";
pub const FAILURE_MESSAGE: &str = "Something went wrong, please try again later";

/// One message for the chat transport to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    Text(String),
    /// Image URL.
    Photo(String),
}

/// Everything sent back for one incoming message, in delivery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub messages: Vec<OutboundMessage>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            messages: vec![OutboundMessage::Text(text.into())],
        }
    }

    /// Text of the first message, if it is a text message.
    pub fn first_text(&self) -> Option<&str> {
        match self.messages.first() {
            Some(OutboundMessage::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn photo(&self) -> Option<&str> {
        self.messages.iter().find_map(|message| match message {
            OutboundMessage::Photo(url) => Some(url.as_str()),
            OutboundMessage::Text(_) => None,
        })
    }
}

fn watch_line(link: &str) -> String {
    format!("Watch it online:\n{}", link)
}

fn not_found_message(tag: SourceTag) -> &'static str {
    if tag.is_default() {
        NOT_FOUND_MESSAGE
    } else {
        NOT_FOUND_TAGGED_MESSAGE
    }
}

/// Answers chat messages using the configured sources.
///
/// Holds no state between messages; every call to [`Orchestrator::handle`]
/// gets its own HTTP client, dropped when the reply is ready.
pub struct Orchestrator<'a> {
    settings: &'a Settings,
}

impl<'a> Orchestrator<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Handle one message with a fresh HTTP client.
    pub async fn handle(&self, message: &str) -> Reply {
        let client = match HttpClient::from_config(&self.settings.http) {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to build HTTP client: {}", e);
                return Reply::text(FAILURE_MESSAGE);
            }
        };
        self.handle_with(&client, message).await
    }

    /// Handle one message, performing every request through `fetcher`.
    pub async fn handle_with(&self, fetcher: &dyn Fetcher, message: &str) -> Reply {
        let query = match SourceQuery::parse(message) {
            Ok(query) => query,
            Err(e) => {
                debug!("Rejected message {:?}: {}", message, e);
                return Reply::text(NOT_FOUND_MESSAGE);
            }
        };

        if query.title.is_empty() {
            return Reply::text(not_found_message(query.source_tag));
        }

        let record = match self.resolve(fetcher, &query).await {
            Ok(record) => record,
            Err(reply) => return reply,
        };

        let link = self.watch_link(fetcher, &record.title).await;
        respond(record, link)
    }

    /// Run the selected source; `Err` carries the terminal reply.
    async fn resolve(&self, fetcher: &dyn Fetcher, query: &SourceQuery) -> Result<MovieRecord, Reply> {
        let source = create_source(query.source_tag, self.settings).map_err(|e| {
            error!("Failed to create {} source: {}", query.source_tag, e);
            Reply::text(FAILURE_MESSAGE)
        })?;

        info!("Looking up '{}' on {}", query.title, source.name());
        match source.resolve(fetcher, &query.title).await {
            Ok(LookupOutcome::Found(record)) => {
                info!("Found '{}' on {}", record.title, source.name());
                Ok(record)
            }
            Ok(LookupOutcome::NotFound) => {
                info!("No match for '{}' on {}", query.title, source.name());
                Err(Reply::text(not_found_message(query.source_tag)))
            }
            Ok(LookupOutcome::Blocked) => {
                warn!("{} blocked the lookup for '{}'", source.name(), query.title);
                Err(Reply::text(BLOCKED_MESSAGE))
            }
            Err(e) => {
                warn!("Lookup for '{}' on {} failed: {}", query.title, source.name(), e);
                Err(Reply::text(FAILURE_MESSAGE))
            }
        }
    }

    async fn watch_link(&self, fetcher: &dyn Fetcher, title: &str) -> Option<String> {
        let resolver = match WatchLinkResolver::new(&self.settings.watch) {
            Ok(resolver) => resolver,
            Err(e) => {
                warn!("Watch link lookup disabled: {}", e);
                return None;
            }
        };

        match resolver.resolve(fetcher, title).await {
            Ok(link) => Some(link),
            Err(e) => {
                debug!("No watch link for '{}': {}", title, e);
                None
            }
        }
    }
}

fn respond(record: MovieRecord, link: Option<String>) -> Reply {
    let mut messages = vec![OutboundMessage::Text(record.caption())];
    if let Some(link) = link {
        messages.push(OutboundMessage::Text(watch_line(&link)));
    }
    if let Some(poster) = record.poster_url {
        messages.push(OutboundMessage::Photo(poster));
    }
    Reply { messages }
}
