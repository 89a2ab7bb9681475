use crate::mcp::errors;
use std::path::PathBuf;

/// Every way a tool invocation can fail. Invocations are all-or-nothing, so
/// one of these is the whole outcome of a failed call.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("image file not found or unreadable: {} ({reason})", path.display())]
    FileNotFound { path: PathBuf, reason: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response format: {0}")]
    ResponseFormat(String),
}

impl ToolError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn response_format(message: impl Into<String>) -> Self {
        Self::ResponseFormat(message.into())
    }

    /// Stable identifier reported to the host framework.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::Configuration(_) => errors::CONFIGURATION_ERROR,
            ToolError::Validation(_) => errors::VALIDATION_ERROR,
            ToolError::FileNotFound { .. } => errors::FILE_NOT_FOUND,
            ToolError::Transport(_) => errors::TRANSPORT_ERROR,
            ToolError::Api { .. } => errors::API_ERROR,
            ToolError::ResponseFormat(_) => errors::RESPONSE_FORMAT_ERROR,
        }
    }

    /// Upstream HTTP status, present only for `Api` failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ToolError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(error: reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            format!("request timed out: {error}")
        } else if error.is_connect() {
            format!("connection failed: {error}")
        } else {
            error.to_string()
        };
        ToolError::Transport(message)
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;
