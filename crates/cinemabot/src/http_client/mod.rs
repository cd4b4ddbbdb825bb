//! HTTP fetching for the lookup pipeline.
//!
//! Every lookup builds its own [`HttpClient`] (and with it a connection pool
//! and cookie jar) and drops it once the reply is assembled, so nothing is
//! shared between requests.

mod response;
mod user_agent;

pub use response::HttpResponse;
pub use user_agent::{resolve_user_agent, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Proxy, StatusCode};
use tracing::debug;

use crate::config::HttpConfig;

/// Error type for fetch operations.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Failed to create HTTP client: {0}")]
    Build(String),
}

impl FetchError {
    /// Status code of a non-success response, if that is what failed.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Http(e) => e.status(),
            _ => None,
        }
    }
}

/// Something that can perform a GET request.
///
/// Sources and the watch-link resolver only see this trait, which keeps them
/// independent of reqwest and lets tests serve canned pages.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` with `query` appended.
    ///
    /// Fails with [`FetchError::Http`] on connection problems or timeouts and
    /// with [`FetchError::Status`] when the server answers with a non-2xx code.
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse, FetchError>;
}

/// Builder for constructing `HttpClient` with optional configuration.
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    proxy: Option<String>,
    proxy_auth: Option<(String, String)>,
}

impl HttpClientBuilder {
    /// Set the user agent string. Not called: default browser user agent.
    pub fn user_agent(mut self, ua: &str) -> Self {
        self.user_agent = Some(ua.to_string());
        self
    }

    /// Route all requests through `url`, optionally with basic auth.
    pub fn proxy(mut self, url: &str, auth: Option<(&str, &str)>) -> Self {
        self.proxy = Some(url.to_string());
        self.proxy_auth = auth.map(|(login, password)| (login.to_string(), password.to_string()));
        self
    }

    /// Build the `HttpClient`.
    pub fn build(self) -> Result<HttpClient, FetchError> {
        let user_agent = resolve_user_agent(self.user_agent.as_deref());

        let mut headers = HeaderMap::new();
        headers.insert(reqwest::header::ACCEPT, HeaderValue::from_static(ACCEPT));
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static(ACCEPT_LANGUAGE),
        );

        let mut builder = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(self.timeout)
            .cookie_store(true)
            .gzip(true)
            .brotli(true);

        if let Some(proxy_url) = &self.proxy {
            let mut proxy = Proxy::all(proxy_url)
                .map_err(|e| FetchError::Build(format!("Invalid proxy URL '{}': {}", proxy_url, e)))?;
            if let Some((login, password)) = &self.proxy_auth {
                proxy = proxy.basic_auth(login, password);
            }
            debug!("Routing requests through proxy {}", proxy_url);
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| FetchError::Build(e.to_string()))?;
        Ok(HttpClient { client })
    }
}

/// reqwest-backed [`Fetcher`].
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a builder for configuring an `HttpClient`.
    pub fn builder(timeout: Duration) -> HttpClientBuilder {
        HttpClientBuilder {
            timeout,
            user_agent: None,
            proxy: None,
            proxy_auth: None,
        }
    }

    /// Build a client from the `[http]` settings section.
    pub fn from_config(config: &HttpConfig) -> Result<Self, FetchError> {
        Self::configured(config)?.build()
    }

    fn configured(config: &HttpConfig) -> Result<HttpClientBuilder, FetchError> {
        let mut builder = Self::builder(config.timeout());
        if let Some(ua) = &config.user_agent {
            builder = builder.user_agent(ua);
        }
        if let Some(proxy) = &config.proxy {
            let auth = config
                .proxy_auth()
                .map_err(|e| FetchError::Build(e.to_string()))?;
            builder = builder.proxy(proxy, auth);
        }
        Ok(builder)
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse, FetchError> {
        let mut request = self.client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let start = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        let final_url = response.url().to_string();

        debug!(
            "GET {} -> {} ({} ms)",
            final_url,
            status.as_u16(),
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            return Err(FetchError::Status {
                url: final_url,
                status,
            });
        }

        let body = response.text().await?;
        Ok(HttpResponse::new(status, final_url, body))
    }
}
