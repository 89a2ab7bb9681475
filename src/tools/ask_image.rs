use crate::client::ViscribeClient;
use crate::error::{Result, ToolError};
use crate::image;
use crate::mcp::contracts;
use crate::tools::{Tool, ToolOutput, parse_args};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AskImageInput {
    pub image_url: Option<String>,
    pub image_base64: Option<String>,
    pub image_path: Option<String>,
    pub question: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskImageOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits_used: Option<u64>,
    pub answer: String,
}

pub struct AskImageTool {
    client: ViscribeClient,
}

impl AskImageTool {
    pub fn new(client: ViscribeClient) -> Self {
        Self { client }
    }

    pub fn run(&self, input: AskImageInput) -> Result<AskImageOutput> {
        let question = input
            .question
            .filter(|question| !question.trim().is_empty())
            .ok_or_else(|| ToolError::validation("question is required"))?;
        let image = image::normalize(
            "image",
            input.image_url.as_deref(),
            input.image_base64.as_deref(),
            input.image_path.as_deref(),
        )?;

        let mut payload = Map::new();
        image.write_into("image", &mut payload);
        payload.insert("question".to_string(), json!(question));
        self.client
            .post(contracts::PATH_ASK_IMAGE, &Value::Object(payload))
    }
}

impl Tool for AskImageTool {
    fn name(&self) -> &'static str {
        contracts::TOOL_ASK_IMAGE
    }

    fn description(&self) -> &'static str {
        contracts::ASK_IMAGE_DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        contracts::ask_image_schema()
    }

    fn invoke(&self, args: &Value) -> Result<ToolOutput> {
        let output = self.run(parse_args(args)?)?;
        ToolOutput::new(output.answer.clone(), &output)
    }
}
