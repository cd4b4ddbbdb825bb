//! cinemabot - movie and TV show lookup for chat bots.
//!
//! Core library: source adapters (TMDB, IMDB, Kinopoisk), the watch-link
//! resolver and the orchestrator that turns a chat message into a reply.

pub mod config;
pub mod extract;
pub mod http_client;
pub mod lookup;
pub mod models;
pub mod sources;
pub mod watch_link;

pub mod prelude {
    pub use crate::config::{ConfigError, Settings};
    pub use crate::http_client::{FetchError, Fetcher, HttpClient, HttpResponse};
    pub use crate::lookup::{OutboundMessage, Orchestrator, Reply};
    pub use crate::models::{LookupOutcome, MovieRecord, SourceQuery, SourceTag};
    pub use crate::sources::{MovieSource, SourceError};
}
