use crate::error::{Result, ToolError};
use std::time::Duration;

pub const API_KEY_ENV: &str = "VISCRIBE_API_KEY";
pub const BASE_URL_ENV: &str = "VISCRIBE_BASE_URL";

pub const DEFAULT_BASE_URL: &str = "https://api.viscribe.ai/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings shared by every tool. Immutable once built.
#[derive(Clone)]
pub struct ClientConfig {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ToolError::configuration("no API key provided"));
        }
        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Resolves the key and base URL from explicit values, falling back to
    /// the process environment. This is the only place the crate reads it.
    pub fn from_env(explicit_key: Option<&str>, explicit_base_url: Option<&str>) -> Result<Self> {
        let api_key = resolve_api_key(explicit_key)?;
        let base_url = first_non_empty(explicit_base_url, std::env::var(BASE_URL_ENV).ok());
        let config = Self::new(api_key)?;
        Ok(match base_url {
            Some(base_url) => config.with_base_url(base_url),
            None => config,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub fn resolve_api_key(explicit_key: Option<&str>) -> Result<String> {
    resolve_api_key_from(explicit_key, std::env::var(API_KEY_ENV).ok())
}

/// Explicit key first, then the environment value; blank values count as absent.
pub fn resolve_api_key_from(explicit_key: Option<&str>, env_value: Option<String>) -> Result<String> {
    first_non_empty(explicit_key, env_value).ok_or_else(|| {
        ToolError::configuration(format!(
            "no API key provided (pass one explicitly or set {API_KEY_ENV})"
        ))
    })
}

fn first_non_empty(explicit: Option<&str>, fallback: Option<String>) -> Option<String> {
    explicit
        .map(str::to_string)
        .filter(|value| !value.trim().is_empty())
        .or_else(|| fallback.filter(|value| !value.trim().is_empty()))
}
