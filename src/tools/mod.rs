use crate::client::ViscribeClient;
use crate::config::ClientConfig;
use crate::error::{Result, ToolError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};

pub mod ask_image;
pub mod classify_image;
pub mod compare_images;
pub mod describe_image;
pub mod extract_image;
pub mod get_credits;
pub mod submit_feedback;

pub use ask_image::AskImageTool;
pub use classify_image::ClassifyImageTool;
pub use compare_images::CompareImagesTool;
pub use describe_image::DescribeImageTool;
pub use extract_image::ExtractImageTool;
pub use get_credits::GetCreditsTool;
pub use submit_feedback::SubmitFeedbackTool;

/// A schema-described callable exposed to the host framework.
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> Value;
    fn invoke(&self, args: &Value) -> Result<ToolOutput>;
}

/// Result of a successful invocation: the structured record plus a short
/// human-readable rendering of it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    pub structured: Value,
}

impl ToolOutput {
    pub fn new<T: Serialize>(text: impl Into<String>, record: &T) -> Result<Self> {
        let structured = serde_json::to_value(record)
            .map_err(|err| ToolError::response_format(format!("failed to encode result: {err}")))?;
        Ok(Self {
            text: text.into(),
            structured,
        })
    }
}

/// Every tool, sharing one client.
pub struct Toolkit {
    tools: Vec<Box<dyn Tool>>,
}

impl Toolkit {
    pub fn new(client: ViscribeClient) -> Self {
        Self {
            tools: vec![
                Box::new(DescribeImageTool::new(client.clone())),
                Box::new(ExtractImageTool::new(client.clone())),
                Box::new(ClassifyImageTool::new(client.clone())),
                Box::new(AskImageTool::new(client.clone())),
                Box::new(CompareImagesTool::new(client.clone())),
                Box::new(GetCreditsTool::new(client.clone())),
                Box::new(SubmitFeedbackTool::new(client)),
            ],
        }
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        Ok(Self::new(ViscribeClient::new(config)?))
    }

    pub fn tools(&self) -> impl Iterator<Item = &dyn Tool> {
        self.tools.iter().map(|tool| tool.as_ref())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools().find(|tool| tool.name() == name)
    }

    /// Runs `name` and renders the outcome as an MCP `tools/call` result.
    pub fn call(&self, name: &str, args: &Value) -> Value {
        match self.get(name) {
            Some(tool) => call(tool, args),
            None => error_result(&ToolError::validation(format!("unknown tool: {name}"))),
        }
    }
}

pub fn call(tool: &dyn Tool, args: &Value) -> Value {
    match tool.invoke(args) {
        Ok(output) => success_result(output),
        Err(err) => {
            tracing::debug!(tool = tool.name(), kind = err.kind(), "tool call failed");
            error_result(&err)
        }
    }
}

pub fn success_result(output: ToolOutput) -> Value {
    json!({
        "content": [{"type": "text", "text": output.text}],
        "structuredContent": output.structured,
        "isError": false
    })
}

pub fn error_result(err: &ToolError) -> Value {
    let message = err.to_string();
    let mut error = json!({
        "kind": err.kind(),
        "message": message,
    });

    if let Some(status) = err.status()
        && let Some(obj) = error.as_object_mut()
    {
        obj.insert("status".to_string(), json!(status));
    }

    json!({
        "content": [{"type": "text", "text": format!("Error: {message}")}],
        "structuredContent": {"error": error},
        "isError": true
    })
}

/// Decodes tool arguments into a typed input record. Absent arguments are
/// treated as an empty object.
pub(crate) fn parse_args<T: DeserializeOwned>(args: &Value) -> Result<T> {
    let args = match args {
        Value::Null => Value::Object(Map::new()),
        Value::Object(_) => args.clone(),
        _ => return Err(ToolError::validation("arguments must be an object")),
    };
    serde_json::from_value(args).map_err(|err| ToolError::validation(err.to_string()))
}

/// Agents often pass structured arguments as JSON-encoded strings; accept
/// both forms.
pub(crate) fn json_or_string(value: Option<Value>, field: &str) -> Result<Option<Value>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|err| ToolError::validation(format!("{field} must be valid JSON: {err}"))),
        Some(value) => Ok(Some(value)),
    }
}

pub(crate) fn insert_optional(payload: &mut Map<String, Value>, key: &str, value: Option<String>) {
    if let Some(value) = value.filter(|value| !value.is_empty()) {
        payload.insert(key.to_string(), json!(value));
    }
}

/// Identifiers come back as strings or bare numbers depending on the endpoint.
pub(crate) fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(value),
        Value::Number(value) => Ok(value.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, found {other}"
        ))),
    }
}
