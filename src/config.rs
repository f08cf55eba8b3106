// src/config.rs
// =============================================================================
// Runtime configuration, read from environment variables (and a .env file if
// one exists). `fetchkit serve --host/--port` override the matching values.
// =============================================================================

use std::env;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub github_api_url: String,
    pub default_branch: String,
    /// Shared secret for the image endpoint. None rejects every request.
    pub image_api_key: Option<String>,
    pub content_concurrency: usize,
    pub http_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            github_api_url: DEFAULT_GITHUB_API_URL.into(),
            default_branch: DEFAULT_BRANCH.into(),
            image_api_key: None,
            content_concurrency: 5,
            http_timeout: Duration::from_secs(30),
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Same as from_env but with the variable source injected, so tests don't
    // have to touch the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("SERVER_HOST").unwrap_or(defaults.host);
        let port = parse_or("SERVER_PORT", lookup("SERVER_PORT"), defaults.port)?;

        let github_api_url = lookup("GITHUB_API_URL")
            .map(|value| value.trim_end_matches('/').to_string())
            .unwrap_or(defaults.github_api_url);
        url::Url::parse(&github_api_url)
            .map_err(|err| AppError::Config(format!("invalid GITHUB_API_URL: {err}")))?;

        let default_branch = lookup("GITHUB_DEFAULT_BRANCH")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.default_branch);

        let image_api_key = lookup("IMAGE_TOOL_API_KEY").filter(|value| !value.is_empty());

        let content_concurrency: usize = parse_or(
            "CONTENT_FETCH_CONCURRENCY",
            lookup("CONTENT_FETCH_CONCURRENCY"),
            defaults.content_concurrency,
        )?;
        if content_concurrency == 0 {
            return Err(AppError::Config(
                "CONTENT_FETCH_CONCURRENCY must be at least 1".into(),
            ));
        }

        let timeout_secs: u64 = parse_or(
            "HTTP_TIMEOUT_SECS",
            lookup("HTTP_TIMEOUT_SECS"),
            defaults.http_timeout.as_secs(),
        )?;

        let max_upload_bytes = parse_or(
            "MAX_UPLOAD_BYTES",
            lookup("MAX_UPLOAD_BYTES"),
            defaults.max_upload_bytes,
        )?;

        Ok(Self {
            host,
            port,
            github_api_url,
            default_branch,
            image_api_key,
            content_concurrency,
            http_timeout: Duration::from_secs(timeout_secs),
            max_upload_bytes,
        })
    }

    /// Builds the outbound HTTP client shared by every GitHub and raw-content call.
    pub fn http_client(&self) -> Result<reqwest::Client, AppError> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| AppError::Config(format!("failed to build HTTP client: {err}")))
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|err| AppError::Config(format!("invalid {key}: {err}"))),
        None => Ok(default),
    }
}
