//! Kinopoisk scraping source.
//!
//! Kinopoisk answers automated traffic with a captcha page that still returns
//! 200. The detail page's title node is the only reliable signal: when it is
//! missing the lookup is reported as [`LookupOutcome::Blocked`].

use async_trait::async_trait;
use scraper::Html;
use tracing::{debug, warn};

use super::{resolve_url, MovieSource, SourceError};
use crate::extract::{extract_from, ExtractError, SelectorDescriptor, TEXT_CONTENT};
use crate::http_client::Fetcher;
use crate::models::{LookupOutcome, MovieRecord, NO_DESCRIPTION};

pub const KINOPOISK_BASE_URL: &str = "https://www.kinopoisk.ru";

const SEARCH_PREFIX: &str = "https://www.kinopoisk.ru/index.php?level=7&from=forma&result=adv\
                             &m_act[from]=forma&m_act[what]=content&m_act[find]=";

/// Advanced-search URL for `title`, with spaces encoded as `+`.
pub fn search_url(title: &str) -> String {
    let encoded = urlencoding::encode(title).replace("%20", "+");
    format!("{}{}", SEARCH_PREFIX, encoded)
}

/// Detail page contents, before the poster requirement is checked.
#[derive(Debug, PartialEq, Eq)]
enum DetailPage {
    Blocked,
    Parsed {
        title: String,
        summary: String,
        poster: Option<String>,
    },
}

/// Source scraping Kinopoisk advanced search and film pages.
pub struct KinopoiskSource {
    search_result: SelectorDescriptor,
    title: SelectorDescriptor,
    poster: SelectorDescriptor,
    summary: SelectorDescriptor,
}

impl KinopoiskSource {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            search_result: SelectorDescriptor::new("div", "info", "a", "href")?,
            title: SelectorDescriptor::container("h1", "moviename-big", TEXT_CONTENT)?,
            poster: SelectorDescriptor::new("div", "movie-info__sidebar", "img", "src")?,
            summary: SelectorDescriptor::container("div", "brand_words film-synopsys", TEXT_CONTENT)?,
        })
    }

    fn parse_search(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        extract_from(&document, &self.search_result)
            .filter(|href| !href.trim().is_empty())
            .map(|href| resolve_url(KINOPOISK_BASE_URL, href.trim()))
    }

    fn parse_detail(&self, html: &str) -> DetailPage {
        let document = Html::parse_document(html);

        let title = match extract_from(&document, &self.title) {
            Some(title) if !title.trim().is_empty() => normalize_spaces(&title),
            _ => return DetailPage::Blocked,
        };

        let summary = extract_from(&document, &self.summary)
            .map(|s| normalize_spaces(&s))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());

        DetailPage::Parsed {
            title,
            summary,
            poster: extract_from(&document, &self.poster),
        }
    }
}

/// Replace the non-breaking spaces and NEL characters Kinopoisk sprinkles
/// through its text with plain spaces, then trim.
fn normalize_spaces(text: &str) -> String {
    text.replace(['\u{a0}', '\u{85}'], " ").trim().to_string()
}

#[async_trait]
impl MovieSource for KinopoiskSource {
    fn name(&self) -> &'static str {
        "kinopoisk"
    }

    async fn resolve(&self, fetcher: &dyn Fetcher, title: &str) -> Result<LookupOutcome, SourceError> {
        let search = fetcher.get(&search_url(title), &[]).await?;

        let Some(detail_url) = self.parse_search(&search.body) else {
            debug!("Kinopoisk search for '{}' returned no films", title);
            return Ok(LookupOutcome::NotFound);
        };
        debug!("Kinopoisk search for '{}' resolved to {}", title, detail_url);

        let detail = fetcher.get(&detail_url, &[]).await?;
        match self.parse_detail(&detail.body) {
            DetailPage::Blocked => {
                warn!("Kinopoisk served a page without a title for {}", detail_url);
                Ok(LookupOutcome::Blocked)
            }
            DetailPage::Parsed { title, summary, poster } => {
                let poster = poster
                    .filter(|p| !p.trim().is_empty())
                    .ok_or(SourceError::MissingField {
                        source_name: "kinopoisk",
                        field: "poster",
                    })?;
                let record = MovieRecord::new(&title, &summary)
                    .ok_or(SourceError::MissingField {
                        source_name: "kinopoisk",
                        field: "title",
                    })?
                    .with_poster(Some(resolve_url(KINOPOISK_BASE_URL, poster.trim())));
                Ok(LookupOutcome::Found(record))
            }
        }
    }
}
