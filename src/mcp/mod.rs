use crate::tools::{Tool, Toolkit};
use serde_json::{Value, json};

pub mod contracts;
pub mod errors;

pub const PROTOCOL_VERSION: &str = "2025-11-25";

pub fn tool_definition(tool: &dyn Tool) -> Value {
    json!({
        "name": tool.name(),
        "description": tool.description(),
        "inputSchema": tool.input_schema()
    })
}

pub fn tool_definitions(toolkit: &Toolkit) -> Vec<Value> {
    toolkit.tools().map(tool_definition).collect()
}
