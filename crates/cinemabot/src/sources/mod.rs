//! Movie metadata sources.
//!
//! Each source turns a free-text title into a [`LookupOutcome`]. The TMDB
//! source talks to a JSON API; the IMDB and Kinopoisk sources scrape search
//! and detail pages with [`SelectorDescriptor`](crate::extract::SelectorDescriptor)s.

pub mod imdb;
pub mod kinopoisk;
pub mod tmdb;

pub use imdb::ImdbSource;
pub use kinopoisk::KinopoiskSource;
pub use tmdb::TmdbSource;

use async_trait::async_trait;

use crate::config::{ConfigError, Settings};
use crate::extract::ExtractError;
use crate::http_client::{FetchError, Fetcher};
use crate::models::{LookupOutcome, SourceTag};

/// Error type for source lookups.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("{source_name} page is missing its {field}")]
    MissingField {
        source_name: &'static str,
        field: &'static str,
    },

    #[error("No result for '{0}'")]
    NoResult(String),

    #[error("Invalid selector: {0}")]
    Selector(#[from] ExtractError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A place to look movies up.
#[async_trait]
pub trait MovieSource: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Look `title` up, performing every request through `fetcher`.
    ///
    /// A title the source does not know is `Ok(LookupOutcome::NotFound)`;
    /// errors are reserved for transport failures and malformed responses.
    async fn resolve(&self, fetcher: &dyn Fetcher, title: &str) -> Result<LookupOutcome, SourceError>;
}

/// Build the source selected by `tag`.
pub fn create_source<'a>(
    tag: SourceTag,
    settings: &'a Settings,
) -> Result<Box<dyn MovieSource + 'a>, SourceError> {
    Ok(match tag {
        SourceTag::Default => Box::new(TmdbSource::new(&settings.tmdb)?),
        SourceTag::ImdbLike => Box::new(ImdbSource::new()?),
        SourceTag::KinopoiskLike => Box::new(KinopoiskSource::new()?),
    })
}

/// Resolve a path to a full URL, handling both absolute and relative paths.
pub fn resolve_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    if let Ok(base) = url::Url::parse(base_url) {
        if let Ok(resolved) = base.join(path) {
            return resolved.to_string();
        }
    }

    let base = base_url.trim_end_matches('/');
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    format!("{}{}", base, path)
}
