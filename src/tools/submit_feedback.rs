use crate::client::ViscribeClient;
use crate::error::{Result, ToolError};
use crate::mcp::contracts;
use crate::tools::{Tool, ToolOutput, id_string, insert_optional, parse_args};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitFeedbackInput {
    pub request_id: Option<String>,
    pub rating: Option<i64>,
    pub feedback_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitFeedbackOutput {
    #[serde(deserialize_with = "id_string")]
    pub feedback_id: String,
    #[serde(deserialize_with = "id_string")]
    pub request_id: String,
    pub message: String,
    pub feedback_timestamp: String,
}

pub struct SubmitFeedbackTool {
    client: ViscribeClient,
}

impl SubmitFeedbackTool {
    pub fn new(client: ViscribeClient) -> Self {
        Self { client }
    }

    pub fn run(&self, input: SubmitFeedbackInput) -> Result<SubmitFeedbackOutput> {
        let payload = build_payload(input)?;
        self.client.post(contracts::PATH_FEEDBACK, &payload)
    }
}

fn build_payload(input: SubmitFeedbackInput) -> Result<Value> {
    let request_id = input
        .request_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ToolError::validation("request_id is required"))?;
    let rating = input
        .rating
        .ok_or_else(|| ToolError::validation("rating is required"))?;
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(ToolError::validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )));
    }

    let mut payload = Map::new();
    payload.insert("request_id".to_string(), json!(request_id));
    payload.insert("rating".to_string(), json!(rating));
    insert_optional(&mut payload, "feedback_text", input.feedback_text);
    Ok(Value::Object(payload))
}

impl Tool for SubmitFeedbackTool {
    fn name(&self) -> &'static str {
        contracts::TOOL_SUBMIT_FEEDBACK
    }

    fn description(&self) -> &'static str {
        contracts::SUBMIT_FEEDBACK_DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        contracts::submit_feedback_schema()
    }

    fn invoke(&self, args: &Value) -> Result<ToolOutput> {
        let output = self.run(parse_args(args)?)?;
        ToolOutput::new(output.message.clone(), &output)
    }
}
