//! TMDB search API source.
//!
//! Searches movies first and TV shows second; the first category with any
//! results wins.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{MovieSource, SourceError};
use crate::config::TmdbConfig;
use crate::http_client::Fetcher;
use crate::models::{format_rating, LookupOutcome, MovieRecord};

/// Search categories in order of preference.
const CATEGORIES: [Category; 2] = [Category::Movie, Category::Tv];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Movie,
    Tv,
}

impl Category {
    fn path(&self) -> &'static str {
        match self {
            Category::Movie => "search/movie",
            Category::Tv => "search/tv",
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total_results: u64,
    #[serde(default)]
    results: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    /// `title` for movies, `name` for TV shows.
    #[serde(alias = "name")]
    title: Option<String>,
    #[serde(alias = "original_name")]
    original_title: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    #[serde(default)]
    vote_average: f64,
}

/// Source backed by the TMDB search API.
pub struct TmdbSource<'a> {
    config: &'a TmdbConfig,
    api_key: &'a str,
}

impl<'a> TmdbSource<'a> {
    /// Create the source; fails when no API key is configured.
    pub fn new(config: &'a TmdbConfig) -> Result<Self, SourceError> {
        let api_key = config.api_key()?;
        Ok(Self { config, api_key })
    }

    fn search_url(&self, category: Category) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), category.path())
    }

    async fn search(
        &self,
        fetcher: &dyn Fetcher,
        category: Category,
        title: &str,
    ) -> Result<SearchResponse, SourceError> {
        let query = [
            ("query", title),
            ("api_key", self.api_key),
            ("language", self.config.language.as_str()),
        ];
        let response = fetcher.get(&self.search_url(category), &query).await?;
        Ok(response.json()?)
    }

    fn record_from(&self, item: SearchItem) -> Option<MovieRecord> {
        let title = item
            .title
            .filter(|t| !t.trim().is_empty())
            .or(item.original_title)?;

        let poster_url = item
            .poster_path
            .filter(|p| !p.is_empty())
            .or(item.backdrop_path.filter(|p| !p.is_empty()))
            .map(|path| format!("{}{}", self.config.image_base_url, path));

        MovieRecord::new(&title, item.overview.as_deref().unwrap_or_default())
            .map(|record| {
                record
                    .with_rating(format_rating(item.vote_average))
                    .with_poster(poster_url)
            })
    }
}

#[async_trait]
impl<'a> MovieSource for TmdbSource<'a> {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    async fn resolve(&self, fetcher: &dyn Fetcher, title: &str) -> Result<LookupOutcome, SourceError> {
        for category in CATEGORIES {
            let response = self.search(fetcher, category, title).await?;
            debug!(
                "TMDB {:?} search for '{}': {} result(s)",
                category, title, response.total_results
            );

            if response.total_results == 0 {
                continue;
            }

            // A category with results answers the lookup, even when its
            // first entry is unusable
            let record = response
                .results
                .into_iter()
                .next()
                .and_then(|item| self.record_from(item));
            return Ok(match record {
                Some(record) => LookupOutcome::Found(record),
                None => LookupOutcome::NotFound,
            });
        }

        Ok(LookupOutcome::NotFound)
    }
}
