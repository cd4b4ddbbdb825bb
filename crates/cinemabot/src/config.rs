//! Configuration for cinemabot.
//!
//! Settings are resolved once at startup and passed by reference to the
//! orchestrator, sources and HTTP client. Resolution order:
//! defaults, then an optional TOML file, then environment variables, then
//! command-line overrides. [`Settings::validate`] runs last.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name `prefer` searches for when no config path is given.
pub const CONFIG_NAME: &str = "cinemabot";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("TMDB API key is not configured (set TMDB_API_KEY or TMDB_API_KEY_FILE)")]
    MissingApiKey,

    #[error("Proxy credentials must look like login:password")]
    InvalidProxyCredentials,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Top-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tmdb: TmdbConfig,
    pub http: HttpConfig,
    pub watch: WatchConfig,
}

/// TMDB metadata API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    pub api_key: Option<String>,
    /// Response language, e.g. `ru-RU`.
    pub language: String,
    pub api_url: String,
    /// Prefix joined with `poster_path` / `backdrop_path`.
    pub image_base_url: String,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            language: "ru-RU".to_string(),
            api_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
        }
    }
}

impl TmdbConfig {
    /// The configured API key.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }
}

/// Outbound HTTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    /// Overrides the built-in browser user agent.
    pub user_agent: Option<String>,
    /// Proxy URL (`http://`, `https://` or `socks5://`).
    pub proxy: Option<String>,
    /// `login:password` for the proxy.
    pub proxy_credentials: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: None,
            proxy: None,
            proxy_credentials: None,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Split `proxy_credentials` into login and password.
    pub fn proxy_auth(&self) -> Result<Option<(&str, &str)>, ConfigError> {
        match self.proxy_credentials.as_deref() {
            None => Ok(None),
            Some(creds) => creds
                .split_once(':')
                .filter(|(login, _)| !login.is_empty())
                .map(Some)
                .ok_or(ConfigError::InvalidProxyCredentials),
        }
    }
}

/// Settings for the "watch online" link lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub search_url: String,
    /// Prepended to the title to form the search query.
    pub query_prefix: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            search_url: "https://www.google.ru/search".to_string(),
            query_prefix: "Смотреть онлайн".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from a `cinemabot` config file
    /// discovered in the standard locations, then apply environment overrides.
    ///
    /// The result is not validated; apply CLI overrides first, then call
    /// [`Settings::validate`].
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => discover().await,
        };
        let settings = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        settings.with_env_overrides()
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    fn from_toml(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply environment-style overrides from `lookup`.
    ///
    /// Recognized keys: `TMDB_API_KEY`, `TMDB_API_KEY_FILE`, `TMDB_LANGUAGE`,
    /// `PROXY`, `PROXY_CREDS`, `CINEMABOT_TIMEOUT_SECS`.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(file) = lookup("TMDB_API_KEY_FILE") {
            let path = PathBuf::from(file);
            let key = fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })?;
            self.tmdb.api_key = Some(key.trim().to_string());
        }
        // A literal key wins over a key file
        if let Some(key) = lookup("TMDB_API_KEY") {
            self.tmdb.api_key = Some(key.trim().to_string());
        }
        if let Some(language) = lookup("TMDB_LANGUAGE") {
            self.tmdb.language = language;
        }
        if let Some(proxy) = lookup("PROXY") {
            self.http.proxy = Some(proxy);
        }
        if let Some(creds) = lookup("PROXY_CREDS") {
            self.http.proxy_credentials = Some(creds);
        }
        if let Some(timeout) = lookup("CINEMABOT_TIMEOUT_SECS") {
            self.http.timeout_secs = timeout.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "CINEMABOT_TIMEOUT_SECS".to_string(),
                value: timeout.clone(),
            })?;
        }

        Ok(self)
    }

    /// Apply command-line overrides.
    pub fn with_cli_overrides(mut self, api_key: Option<String>, proxy: Option<String>) -> Self {
        if let Some(key) = api_key {
            self.tmdb.api_key = Some(key);
        }
        if let Some(proxy) = proxy {
            self.http.proxy = Some(proxy);
        }
        self
    }

    /// Check that everything required to serve lookups is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tmdb.api_key()?;
        self.http.proxy_auth()?;
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "http.timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Copy of the settings safe to print.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.tmdb.api_key = copy.tmdb.api_key.as_deref().map(mask);
        copy.http.proxy_credentials = copy
            .http
            .proxy_credentials
            .as_deref()
            .map(|creds| match creds.split_once(':') {
                Some((login, _)) => format!("{}:****", login),
                None => "****".to_string(),
            });
        copy
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "settings".to_string(),
            value: e.to_string(),
        })
    }
}

/// Find a config file with `prefer`; `None` when nothing is discovered.
async fn discover() -> Option<PathBuf> {
    match prefer::load(CONFIG_NAME).await {
        Ok(found) => found.source_path().map(|path| path.to_path_buf()),
        Err(e) => {
            debug!("No {} config file discovered: {}", CONFIG_NAME, e);
            None
        }
    }
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}
