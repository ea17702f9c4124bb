//! Centralized configuration management for birthday-book

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::Role;
use crate::session::Session;
use crate::table::DEFAULT_ROWS_PER_PAGE_OPTIONS;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the birthday service, including the `/api` prefix
    pub api_url: String,
    /// Bearer token from a previous `login`
    pub token: Option<String>,
    /// Role reported alongside the token
    pub role: Role,
    /// Directory photos are saved to
    pub photo_dir: PathBuf,
    /// Page sizes offered by tables; the first one is the default
    pub rows_per_page_options: Vec<usize>,
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "birthday-book/0.1.0".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            role: Role::User,
            photo_dir: PathBuf::from("./photos"),
            rows_per_page_options: DEFAULT_ROWS_PER_PAGE_OPTIONS.to_vec(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let api_url = std::env::var("BIRTHDAY_BOOK_API_URL").unwrap_or(defaults.api_url);

        let token = std::env::var("BIRTHDAY_BOOK_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        let role = std::env::var("BIRTHDAY_BOOK_ROLE")
            .map(|r| Role::parse(&r))
            .unwrap_or(defaults.role);

        let photo_dir = std::env::var("BIRTHDAY_BOOK_PHOTO_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.photo_dir);

        let rows_per_page_options = match std::env::var("BIRTHDAY_BOOK_ROWS_PER_PAGE") {
            Ok(raw) => parse_rows_per_page(&raw)?,
            Err(_) => defaults.rows_per_page_options,
        };

        let http = HttpConfig {
            timeout_seconds: parse_env_var("BIRTHDAY_BOOK_HTTP_TIMEOUT_SECONDS")?
                .unwrap_or(defaults.http.timeout_seconds),
            user_agent: std::env::var("BIRTHDAY_BOOK_USER_AGENT")
                .unwrap_or(defaults.http.user_agent),
        };

        Ok(Config {
            api_url,
            token,
            role,
            photo_dir,
            rows_per_page_options,
            http,
        })
    }

    /// Session built from the configured token and role
    pub fn session(&self) -> Session {
        match &self.token {
            Some(token) => Session::new(token, self.role),
            None => Session::anonymous(),
        }
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "API URL must start with http:// or https://: {}",
                self.api_url
            ));
        }

        if self.http.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("HTTP timeout must be at least one second"));
        }

        if self.rows_per_page_options.is_empty() {
            return Err(anyhow::anyhow!("At least one rows-per-page option is required"));
        }

        Ok(())
    }

    /// Make sure the photo directory exists before writing into it
    pub fn ensure_photo_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.photo_dir).with_context(|| {
            format!("Cannot create photo directory: {}", self.photo_dir.display())
        })
    }
}

/// Parse a comma separated list of positive page sizes, e.g. "5,10,25"
fn parse_rows_per_page(raw: &str) -> Result<Vec<usize>> {
    let options = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .with_context(|| format!("Invalid rows-per-page value '{}'", s))
        })
        .collect::<Result<Vec<_>>>()?;

    if options.is_empty() || options.contains(&0) {
        return Err(anyhow::anyhow!(
            "Rows-per-page options must be positive integers, got '{}'",
            raw
        ));
    }
    Ok(options)
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}
