//! Viscribe image-understanding API exposed as MCP tools.
//!
//! Each tool validates its arguments, normalizes image references, makes one
//! blocking HTTP call and maps the response into a typed record or a
//! [`ToolError`].

pub mod client;
pub mod config;
pub mod error;
pub mod image;
pub mod mcp;
pub mod tools;

#[cfg(test)]
mod test_support;

pub use client::ViscribeClient;
pub use config::ClientConfig;
pub use error::{Result, ToolError};
pub use tools::{Tool, ToolOutput, Toolkit};
