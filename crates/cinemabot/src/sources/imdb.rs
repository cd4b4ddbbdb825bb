//! IMDB scraping source.

use async_trait::async_trait;
use scraper::Html;
use tracing::debug;

use super::{resolve_url, MovieSource, SourceError};
use crate::extract::{contains, extract_from, ExtractError, SelectorDescriptor, TEXT_CONTENT};
use crate::http_client::Fetcher;
use crate::models::{LookupOutcome, MovieRecord, NO_DESCRIPTION};

pub const IMDB_BASE_URL: &str = "https://www.imdb.com";
const IMDB_SEARCH_URL: &str = "https://www.imdb.com/find";

/// Source scraping IMDB title search and title pages.
pub struct ImdbSource {
    search_result: SelectorDescriptor,
    title: SelectorDescriptor,
    poster: SelectorDescriptor,
    summary: SelectorDescriptor,
    summary_link: SelectorDescriptor,
}

impl ImdbSource {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            search_result: SelectorDescriptor::new("tr", "findResult odd", "a", "href")?,
            title: SelectorDescriptor::new("div", "title_block", "h1", TEXT_CONTENT)?,
            poster: SelectorDescriptor::new("div", "poster", "img", "src")?,
            summary: SelectorDescriptor::container("div", "summary_text", TEXT_CONTENT)?,
            summary_link: SelectorDescriptor::new("div", "summary_text", "a", TEXT_CONTENT)?,
        })
    }

    /// Absolute URL of the first title in the search results.
    fn parse_search(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        extract_from(&document, &self.search_result)
            .filter(|href| !href.trim().is_empty())
            .map(|href| resolve_url(IMDB_BASE_URL, href.trim()))
    }

    /// Build a record from a title page; `None` when the title is missing.
    fn parse_detail(&self, html: &str) -> Option<MovieRecord> {
        let document = Html::parse_document(html);

        let title = extract_from(&document, &self.title).map(|t| clean_text(&t))?;

        // IMDB renders an "Add a Plot" link in place of a missing synopsis
        let summary = if contains(&document, &self.summary_link) {
            NO_DESCRIPTION.to_string()
        } else {
            extract_from(&document, &self.summary)
                .map(|s| clean_text(&s))
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string())
        };

        let poster = extract_from(&document, &self.poster);

        MovieRecord::new(&title, &summary).map(|record| record.with_poster(poster))
    }
}

/// Collapse runs of whitespace (including non-breaking spaces) to one space.
fn clean_text(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl MovieSource for ImdbSource {
    fn name(&self) -> &'static str {
        "imdb"
    }

    async fn resolve(&self, fetcher: &dyn Fetcher, title: &str) -> Result<LookupOutcome, SourceError> {
        let search = fetcher
            .get(IMDB_SEARCH_URL, &[("s", "tt"), ("q", title)])
            .await?;

        let Some(detail_url) = self.parse_search(&search.body) else {
            debug!("IMDB search for '{}' returned no titles", title);
            return Ok(LookupOutcome::NotFound);
        };
        debug!("IMDB search for '{}' resolved to {}", title, detail_url);

        let detail = fetcher.get(&detail_url, &[]).await?;
        Ok(match self.parse_detail(&detail.body) {
            Some(record) => LookupOutcome::Found(record),
            None => {
                debug!("IMDB title page {} has no title block", detail_url);
                LookupOutcome::NotFound
            }
        })
    }
}
