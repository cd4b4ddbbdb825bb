//! Orchestrator Tests
//!
//! Drives full lookups through an in-memory fetcher serving the pages under
//! `tests/fixtures/`, so no test touches the network.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use cinemabot::config::Settings;
use cinemabot::http_client::{FetchError, Fetcher, HttpResponse};
use cinemabot::lookup::{
    OutboundMessage, Orchestrator, BLOCKED_MESSAGE, FAILURE_MESSAGE, NOT_FOUND_MESSAGE,
    NOT_FOUND_TAGGED_MESSAGE,
};
use cinemabot::sources::kinopoisk;

const TMDB_MOVIE: &str = include_str!("fixtures/tmdb_movie_inception.json");
const TMDB_TV: &str = include_str!("fixtures/tmdb_tv_friends.json");
const TMDB_EMPTY: &str = include_str!("fixtures/tmdb_empty.json");
const GOOGLE_RESULTS: &str = include_str!("fixtures/google_results.html");
const KP_SEARCH: &str = include_str!("fixtures/kinopoisk_search.html");
const KP_FILM: &str = include_str!("fixtures/kinopoisk_film.html");
const KP_CAPTCHA: &str = include_str!("fixtures/kinopoisk_captcha.html");
const IMDB_FIND: &str = include_str!("fixtures/imdb_find.html");
const IMDB_TITLE: &str = include_str!("fixtures/imdb_title.html");

const WATCH_LINK: &str = "https://www.ivi.ru/watch/film-online";

/// Serves canned bodies keyed by URL plus raw query, and records every request.
#[derive(Default)]
struct FakeFetcher {
    pages: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

fn request_key(url: &str, query: &[(&str, &str)]) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let pairs: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{}?{}", url, pairs.join("&"))
}

impl FakeFetcher {
    fn page(mut self, url: &str, query: &[(&str, &str)], body: &str) -> Self {
        self.pages.insert(request_key(url, query), body.to_string());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse, FetchError> {
        let key = request_key(url, query);
        self.calls.lock().unwrap().push(key.clone());
        match self.pages.get(&key) {
            Some(body) => Ok(HttpResponse::new(StatusCode::OK, url, body.as_str())),
            None => Err(FetchError::Status {
                url: key,
                status: StatusCode::NOT_FOUND,
            }),
        }
    }
}

fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.tmdb.api_key = Some("test-key".to_string());
    settings
}

fn tmdb(category: &str, title: &str, body: &str, fetcher: FakeFetcher) -> FakeFetcher {
    fetcher.page(
        &format!("https://api.themoviedb.org/3/search/{}", category),
        &[("query", title), ("api_key", "test-key"), ("language", "ru-RU")],
        body,
    )
}

fn google(title: &str, fetcher: FakeFetcher) -> FakeFetcher {
    let query = format!("Смотреть онлайн {}", title);
    fetcher.page("https://www.google.ru/search", &[("q", query.as_str())], GOOGLE_RESULTS)
}

fn texts(messages: &[OutboundMessage]) -> Vec<&str> {
    messages
        .iter()
        .filter_map(|m| match m {
            OutboundMessage::Text(text) => Some(text.as_str()),
            OutboundMessage::Photo(_) => None,
        })
        .collect()
}

#[tokio::test]
async fn default_source_returns_rated_movie_with_link_and_poster() {
    let settings = settings();
    let fetcher = google("Inception", tmdb("movie", "Inception", TMDB_MOVIE, FakeFetcher::default()));

    let reply = Orchestrator::new(&settings).handle_with(&fetcher, "Inception").await;

    let caption = reply.first_text().unwrap();
    assert!(caption.starts_with("Inception:\nОценка: 8.4 (10)\n"));
    assert!(caption.contains("Сюжет: Cobb steals secrets"));
    assert_eq!(
        reply.messages,
        vec![
            OutboundMessage::Text(caption.to_string()),
            OutboundMessage::Text(format!("Watch it online:\n{}", WATCH_LINK)),
            OutboundMessage::Photo(
                "https://image.tmdb.org/t/p/w500/9gk7adHYeDvHkCSEqAvQNLV5Uge.jpg".to_string()
            ),
        ]
    );

    // Movie results win, so series are never searched
    assert!(fetcher.calls().iter().all(|call| !call.contains("/search/tv")));
}

#[tokio::test]
async fn default_source_falls_back_to_tv() {
    let settings = settings();
    let fetcher = FakeFetcher::default();
    let fetcher = tmdb("movie", "Friends", TMDB_EMPTY, fetcher);
    let fetcher = google("Friends", tmdb("tv", "Friends", TMDB_TV, fetcher));

    let reply = Orchestrator::new(&settings).handle_with(&fetcher, "Friends").await;

    assert_eq!(reply.first_text(), Some("Friends:\nОценка: 8.0 (10)\n"));
    assert_eq!(
        reply.photo(),
        Some("https://image.tmdb.org/t/p/w500/l0qVZIpXtIo7km9u5Yqh0nKPOr5.jpg")
    );
}

#[tokio::test]
async fn unusable_movie_hit_does_not_fall_through_to_tv() {
    let settings = settings();
    let fetcher = FakeFetcher::default();
    let fetcher = tmdb("movie", "Friends", r#"{"total_results": 1, "results": [{"title": ""}]}"#, fetcher);
    let fetcher = google("Friends", tmdb("tv", "Friends", TMDB_TV, fetcher));

    let reply = Orchestrator::new(&settings).handle_with(&fetcher, "Friends").await;

    assert_eq!(reply.messages, vec![OutboundMessage::Text(NOT_FOUND_MESSAGE.to_string())]);
    assert_eq!(fetcher.calls().len(), 1);
    assert!(fetcher.calls()[0].contains("/search/movie"));
}

#[tokio::test]
async fn unknown_title_gets_not_found_reply() {
    let settings = settings();
    let title = "Zzzqqqnonexistentmovie123";
    let fetcher = tmdb("tv", title, TMDB_EMPTY, tmdb("movie", title, TMDB_EMPTY, FakeFetcher::default()));

    let reply = Orchestrator::new(&settings).handle_with(&fetcher, title).await;

    assert_eq!(reply.messages, vec![OutboundMessage::Text(NOT_FOUND_MESSAGE.to_string())]);
    // No watch link lookup after a miss
    assert_eq!(fetcher.calls().len(), 2);
}

#[tokio::test]
async fn unknown_tag_makes_no_requests() {
    let settings = settings();
    let fetcher = FakeFetcher::default();

    let reply = Orchestrator::new(&settings).handle_with(&fetcher, "#xx something").await;

    assert_eq!(
        reply.messages,
        vec![OutboundMessage::Text(
            "Please write the correct Film or TV show name".to_string()
        )]
    );
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn tag_without_title_makes_no_requests() {
    let settings = settings();
    let fetcher = FakeFetcher::default();

    let reply = Orchestrator::new(&settings).handle_with(&fetcher, "#kp   ").await;

    assert_eq!(reply.first_text(), Some(NOT_FOUND_TAGGED_MESSAGE));
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn kinopoisk_lookup() {
    let settings = settings();
    let fetcher = FakeFetcher::default()
        .page(&kinopoisk::search_url("Титаник"), &[], KP_SEARCH)
        .page("https://www.kinopoisk.ru/film/2213/", &[], KP_FILM);
    let fetcher = google("Титаник", fetcher);

    let reply = Orchestrator::new(&settings).handle_with(&fetcher, "#kp Титаник").await;

    assert_eq!(
        texts(&reply.messages),
        vec![
            "Титаник:\nАпрель 1912 года. В первом и последнем плавании шикарного «Титаника» встречаются двое.\n",
            "Watch it online:\nhttps://www.ivi.ru/watch/film-online",
        ]
    );
    assert_eq!(
        reply.photo(),
        Some("https://st.kp.yandex.net/images/film_iphone/iphone360_2213.jpg")
    );
}

#[tokio::test]
async fn kinopoisk_captcha_is_reported_as_blocked() {
    let settings = settings();
    let fetcher = FakeFetcher::default()
        .page(&kinopoisk::search_url("Титаник"), &[], KP_SEARCH)
        .page("https://www.kinopoisk.ru/film/2213/", &[], KP_CAPTCHA);

    let reply = Orchestrator::new(&settings).handle_with(&fetcher, "#kp Титаник").await;

    assert_eq!(reply.messages, vec![OutboundMessage::Text(BLOCKED_MESSAGE.to_string())]);
}

#[tokio::test]
async fn kinopoisk_empty_search_is_not_found() {
    let settings = settings();
    let fetcher = FakeFetcher::default().page(
        &kinopoisk::search_url("Zzzq"),
        &[],
        r#"<div class="search_results"></div>"#,
    );

    let reply = Orchestrator::new(&settings).handle_with(&fetcher, "#kp Zzzq").await;

    assert_eq!(reply.first_text(), Some(NOT_FOUND_TAGGED_MESSAGE));
    assert_eq!(fetcher.calls().len(), 1);
}

#[tokio::test]
async fn kinopoisk_page_without_poster_fails() {
    let settings = settings();
    let fetcher = FakeFetcher::default()
        .page(&kinopoisk::search_url("Титаник"), &[], KP_SEARCH)
        .page(
            "https://www.kinopoisk.ru/film/2213/",
            &[],
            r#"<h1 class="moviename-big">Титаник</h1>"#,
        );

    let reply = Orchestrator::new(&settings).handle_with(&fetcher, "#kp Титаник").await;

    assert_eq!(reply.first_text(), Some(FAILURE_MESSAGE));
}

#[tokio::test]
async fn imdb_lookup() {
    let settings = settings();
    let fetcher = FakeFetcher::default()
        .page("https://www.imdb.com/find", &[("s", "tt"), ("q", "The Matrix")], IMDB_FIND)
        .page("https://www.imdb.com/title/tt0133093/?ref_=fn_tt_tt_1", &[], IMDB_TITLE);
    let fetcher = google("The Matrix (1999)", fetcher);

    let reply = Orchestrator::new(&settings).handle_with(&fetcher, "#im The Matrix").await;

    assert_eq!(
        reply.first_text(),
        Some("The Matrix (1999):\nA computer hacker learns from mysterious rebels about the true nature of his reality.\n")
    );
    assert_eq!(reply.photo(), Some("https://m.media-amazon.com/images/M/matrix-poster.jpg"));
    assert_eq!(reply.messages.len(), 3);
}

#[tokio::test]
async fn watch_link_failure_omits_the_line() {
    let settings = settings();
    // No search page registered, so the watch link lookup gets a 404
    let fetcher = tmdb("movie", "Inception", TMDB_MOVIE, FakeFetcher::default());

    let reply = Orchestrator::new(&settings).handle_with(&fetcher, "Inception").await;

    assert_eq!(texts(&reply.messages).len(), 1);
    assert!(reply.first_text().unwrap().starts_with("Inception:\n"));
    assert!(reply.photo().is_some());
}

#[tokio::test]
async fn transport_error_gets_generic_reply() {
    let settings = settings();
    let fetcher = FakeFetcher::default();

    let reply = Orchestrator::new(&settings).handle_with(&fetcher, "Inception").await;

    assert_eq!(reply.messages, vec![OutboundMessage::Text(FAILURE_MESSAGE.to_string())]);
    assert_eq!(fetcher.calls().len(), 1);
}

#[tokio::test]
async fn missing_api_key_gets_generic_reply() {
    let settings = Settings::default();
    let fetcher = FakeFetcher::default();

    let reply = Orchestrator::new(&settings).handle_with(&fetcher, "Inception").await;

    assert_eq!(reply.first_text(), Some(FAILURE_MESSAGE));
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn malformed_api_response_gets_generic_reply() {
    let settings = settings();
    let fetcher = tmdb("movie", "Inception", "<html>gateway error</html>", FakeFetcher::default());

    let reply = Orchestrator::new(&settings).handle_with(&fetcher, "Inception").await;

    assert_eq!(reply.first_text(), Some(FAILURE_MESSAGE));
}
