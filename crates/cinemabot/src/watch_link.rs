//! "Watch online" link lookup through a web search engine.

use scraper::Html;
use tracing::debug;

use crate::config::WatchConfig;
use crate::extract::{extract_from, ExtractError, SelectorDescriptor};
use crate::http_client::Fetcher;
use crate::sources::SourceError;

/// Finds the first organic search result for a resolved title.
pub struct WatchLinkResolver<'a> {
    config: &'a WatchConfig,
    result_link: SelectorDescriptor,
}

impl<'a> WatchLinkResolver<'a> {
    pub fn new(config: &'a WatchConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            config,
            result_link: SelectorDescriptor::new("div", "r", "a", "href")?,
        })
    }

    /// Search query sent for `title`.
    pub fn query(&self, title: &str) -> String {
        format!("{} {}", self.config.query_prefix, title)
    }

    pub async fn resolve(&self, fetcher: &dyn Fetcher, title: &str) -> Result<String, SourceError> {
        let query = self.query(title);
        let response = fetcher
            .get(&self.config.search_url, &[("q", query.as_str())])
            .await?;

        let link = self
            .parse_results(&response.body)
            .ok_or_else(|| SourceError::NoResult(title.to_string()))?;
        debug!("Watch link for '{}': {}", title, link);
        Ok(link)
    }

    fn parse_results(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let href = extract_from(&document, &self.result_link)?;
        extract_url(href.trim())
    }
}

/// Turn a result anchor's href into an absolute URL.
fn extract_url(href: &str) -> Option<String> {
    // Google wraps results as /url?q=<encoded_url>&sa=...
    if let Some(rest) = href.strip_prefix("/url?") {
        let encoded = rest
            .split('&')
            .find_map(|pair| pair.strip_prefix("q="))?;
        return urlencoding::decode(encoded)
            .ok()
            .map(|s| s.into_owned())
            .filter(|url| url.starts_with("http://") || url.starts_with("https://"));
    }

    if href.starts_with("http://") || href.starts_with("https://") {
        Some(href.to_string())
    } else if href.starts_with("//") {
        Some(format!("https:{}", href))
    } else {
        None
    }
}
