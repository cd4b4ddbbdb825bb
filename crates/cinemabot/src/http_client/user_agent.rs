//! Browser-like request identity.
//!
//! The scraped sites serve stripped or blocked pages to obvious bots, so every
//! request carries the headers of a desktop Chrome build.

/// Default user agent sent with every request.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/77.0.3865.121 Safari/537.36";

/// Accept header matching the user agent.
pub const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Accept-Language header; the bot answers in Russian.
pub const ACCEPT_LANGUAGE: &str = "ru-RU,ru;q=0.9,en;q=0.8";

/// Resolve user agent from config value.
/// - None or empty => default browser user agent
/// - other => custom user agent string
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config.map(str::trim) {
        None | Some("") => USER_AGENT.to_string(),
        Some(custom) => custom.to_string(),
    }
}
