//! Domain types shared by sources and the orchestrator.

use std::fmt;

/// Summary used by scraping sources when a page has no plot.
pub const NO_DESCRIPTION: &str = "No description";

/// Metadata for one movie or TV show.
///
/// A record is only built when a title was resolved; "not found" is
/// [`LookupOutcome::NotFound`], never an empty record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieRecord {
    pub title: String,
    pub summary: String,
    pub poster_url: Option<String>,
    /// Only set by the TMDB source.
    pub rating: Option<String>,
}

impl MovieRecord {
    /// Create a record. Returns `None` when the title is blank.
    pub fn new(title: &str, summary: &str) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            summary: summary.trim().to_string(),
            poster_url: None,
            rating: None,
        })
    }

    pub fn with_poster(mut self, poster_url: Option<String>) -> Self {
        self.poster_url = poster_url.filter(|url| !url.trim().is_empty());
        self
    }

    pub fn with_rating(mut self, rating: String) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Text shown to the user.
    ///
    /// Rated records (TMDB) render as `title:\nОценка: r (10)\nСюжет: ...`,
    /// omitting the plot line for an empty overview. Scraped records render as
    /// `title:\nsummary\n`.
    pub fn caption(&self) -> String {
        match &self.rating {
            Some(rating) => {
                let mut text = format!("{}:\nОценка: {} (10)\n", self.title, rating);
                if !self.summary.is_empty() {
                    text.push_str("Сюжет: ");
                    text.push_str(&self.summary);
                }
                text
            }
            None => format!("{}:\n{}\n", self.title, self.summary),
        }
    }
}

/// Which source a query should be answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceTag {
    /// TMDB API.
    Default,
    /// IMDB, selected with `#im`.
    ImdbLike,
    /// Kinopoisk, selected with `#kp`.
    KinopoiskLike,
}

impl SourceTag {
    /// Resolve a tag marker without the leading `#`.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "im" => Some(SourceTag::ImdbLike),
            "kp" => Some(SourceTag::KinopoiskLike),
            _ => None,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, SourceTag::Default)
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceTag::Default => "tmdb",
            SourceTag::ImdbLike => "imdb",
            SourceTag::KinopoiskLike => "kinopoisk",
        };
        f.write_str(name)
    }
}

/// Error type for query parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Unknown source tag: #{0}")]
    UnknownSource(String),
}

/// A normalized incoming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    pub raw_text: String,
    /// Title with any source marker stripped and whitespace trimmed.
    pub title: String,
    pub source_tag: SourceTag,
}

impl SourceQuery {
    /// Parse a chat message.
    ///
    /// `#im <title>` and `#kp <title>` select a scraping source; any other
    /// text starting with `#` is rejected. Everything else goes to TMDB.
    pub fn parse(raw_text: &str) -> Result<Self, QueryError> {
        let text = raw_text.trim();

        let (source_tag, title) = match text.strip_prefix('#') {
            Some(rest) => {
                let (marker, title) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let tag = SourceTag::from_marker(marker)
                    .ok_or_else(|| QueryError::UnknownSource(marker.to_string()))?;
                (tag, title)
            }
            None => (SourceTag::Default, text),
        };

        Ok(Self {
            raw_text: raw_text.to_string(),
            title: title.trim().to_string(),
            source_tag,
        })
    }
}

/// Result of asking one source about a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(MovieRecord),
    NotFound,
    /// The site served an anti-bot page instead of the detail page.
    Blocked,
}

/// Render a TMDB vote average the way users expect it: always at least one
/// decimal place (`8.0`, `7.5`, `6.25`).
pub fn format_rating(vote_average: f64) -> String {
    if vote_average.fract() == 0.0 {
        format!("{:.1}", vote_average)
    } else {
        format!("{}", vote_average)
    }
}
