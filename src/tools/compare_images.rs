use crate::client::ViscribeClient;
use crate::error::Result;
use crate::image;
use crate::mcp::contracts;
use crate::tools::{Tool, ToolOutput, parse_args};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompareImagesInput {
    pub image1_url: Option<String>,
    pub image1_base64: Option<String>,
    pub image1_path: Option<String>,
    pub image2_url: Option<String>,
    pub image2_base64: Option<String>,
    pub image2_path: Option<String>,
    pub instruction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareImagesOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits_used: Option<u64>,
    pub comparison_result: String,
}

pub struct CompareImagesTool {
    client: ViscribeClient,
}

impl CompareImagesTool {
    pub fn new(client: ViscribeClient) -> Self {
        Self { client }
    }

    pub fn run(&self, input: CompareImagesInput) -> Result<CompareImagesOutput> {
        // Both slots are validated before either file is read.
        let first = image::ImageSource::select(
            "image1",
            input.image1_url.as_deref(),
            input.image1_base64.as_deref(),
            input.image1_path.as_deref(),
        )?;
        let second = image::ImageSource::select(
            "image2",
            input.image2_url.as_deref(),
            input.image2_base64.as_deref(),
            input.image2_path.as_deref(),
        )?;
        let first = image::normalize_selected("image1", first)?;
        let second = image::normalize_selected("image2", second)?;

        let instruction = input
            .instruction
            .filter(|instruction| !instruction.trim().is_empty())
            .unwrap_or_else(|| contracts::DEFAULT_COMPARE_INSTRUCTION.to_string());

        let mut payload = Map::new();
        first.write_into("image1", &mut payload);
        second.write_into("image2", &mut payload);
        payload.insert("instruction".to_string(), json!(instruction));
        self.client
            .post(contracts::PATH_COMPARE_IMAGES, &Value::Object(payload))
    }
}

impl Tool for CompareImagesTool {
    fn name(&self) -> &'static str {
        contracts::TOOL_COMPARE_IMAGES
    }

    fn description(&self) -> &'static str {
        contracts::COMPARE_IMAGES_DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        contracts::compare_images_schema()
    }

    fn invoke(&self, args: &Value) -> Result<ToolOutput> {
        let output = self.run(parse_args(args)?)?;
        ToolOutput::new(output.comparison_result.clone(), &output)
    }
}
