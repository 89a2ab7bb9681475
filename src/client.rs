//! Blocking transport shared by every tool.
//!
//! One call in, one HTTP request out. No retries and no caching: a failure is
//! mapped into [`ToolError`] and handed straight back to the caller.

use crate::config::ClientConfig;
use crate::error::{Result, ToolError};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const USER_AGENT: &str = concat!("mcp-viscribe/", env!("CARGO_PKG_VERSION"));
pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Clone)]
pub struct ViscribeClient {
    http: Client,
    config: ClientConfig,
}

impl ViscribeClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()
            .map_err(|err| {
                ToolError::configuration(format!("failed to build HTTP client: {err}"))
            })?;
        Ok(Self { http, config })
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.http.get(self.url(path));
        self.execute("GET", path, request)
    }

    pub fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let request = self.http.post(self.url(path)).json(body);
        self.execute("POST", path, request)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url(), path.trim_start_matches('/'))
    }

    fn execute<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        tracing::debug!(method, path, "sending upstream request");
        let response = request
            .header(API_KEY_HEADER, self.config.api_key())
            .send()
            .map_err(|err| {
                tracing::warn!(method, path, error = %err, "upstream request failed");
                ToolError::from(err)
            })?;

        let status = response.status();
        let body = response.text().map_err(ToolError::from)?;
        tracing::debug!(method, path, status = status.as_u16(), "upstream responded");

        if !status.is_success() {
            let message = upstream_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            tracing::warn!(method, path, status = status.as_u16(), "upstream returned an error");
            return Err(ToolError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body)
            .map_err(|err| ToolError::response_format(format!("{method} {path}: {err}")))
    }
}

/// Best-effort extraction of an error message from a failed response body.
/// JSON bodies yield their `error`, `detail`, or `message` field when it is a
/// string, otherwise the compact JSON; anything else is returned as raw text.
pub fn upstream_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return Some(trimmed.to_string());
    };
    let field = ["error", "detail", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|value| value.as_str()));
    Some(match field {
        Some(message) => message.to_string(),
        None => value.to_string(),
    })
}
