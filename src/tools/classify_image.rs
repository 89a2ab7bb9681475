use crate::client::ViscribeClient;
use crate::error::{Result, ToolError};
use crate::image;
use crate::mcp::contracts;
use crate::tools::{Tool, ToolOutput, insert_optional, json_or_string, parse_args};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifyImageInput {
    pub image_url: Option<String>,
    pub image_base64: Option<String>,
    pub image_path: Option<String>,
    pub classes: Option<Value>,
    pub class_descriptions: Option<Value>,
    pub instruction: Option<String>,
    #[serde(default)]
    pub multi_label: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyImageOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits_used: Option<u64>,
    pub classification: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

pub struct ClassifyImageTool {
    client: ViscribeClient,
}

impl ClassifyImageTool {
    pub fn new(client: ViscribeClient) -> Self {
        Self { client }
    }

    pub fn run(&self, input: ClassifyImageInput) -> Result<ClassifyImageOutput> {
        let payload = build_payload(input)?;
        self.client.post(contracts::PATH_CLASSIFY_IMAGE, &payload)
    }
}

fn build_payload(input: ClassifyImageInput) -> Result<Value> {
    let classes = parse_classes(input.classes)?;
    let descriptions = parse_class_descriptions(input.class_descriptions)?;
    let image = image::normalize(
        "image",
        input.image_url.as_deref(),
        input.image_base64.as_deref(),
        input.image_path.as_deref(),
    )?;

    let mut payload = Map::new();
    image.write_into("image", &mut payload);
    payload.insert("classes".to_string(), json!(classes));
    if let Some(descriptions) = descriptions {
        payload.insert("class_descriptions".to_string(), json!(descriptions));
    }
    insert_optional(&mut payload, "instruction", input.instruction);
    payload.insert("multi_label".to_string(), json!(input.multi_label));
    Ok(Value::Object(payload))
}

/// Class names keep caller order; blanks and duplicates are rejected.
pub fn parse_classes(value: Option<Value>) -> Result<Vec<String>> {
    let Some(value) = json_or_string(value, "classes")? else {
        return Err(ToolError::validation("classes is required"));
    };
    let classes: Vec<String> = serde_json::from_value(value)
        .map_err(|_| ToolError::validation("classes must be an array of strings"))?;
    if classes.is_empty() {
        return Err(ToolError::validation("classes must not be empty"));
    }
    for (index, class) in classes.iter().enumerate() {
        if class.trim().is_empty() {
            return Err(ToolError::validation("class names must not be empty"));
        }
        if classes[..index].contains(class) {
            return Err(ToolError::validation(format!("duplicate class: {class}")));
        }
    }
    Ok(classes)
}

pub fn parse_class_descriptions(value: Option<Value>) -> Result<Option<BTreeMap<String, String>>> {
    let Some(value) = json_or_string(value, "class_descriptions")? else {
        return Ok(None);
    };
    serde_json::from_value(value).map(Some).map_err(|_| {
        ToolError::validation("class_descriptions must map class names to strings")
    })
}

impl Tool for ClassifyImageTool {
    fn name(&self) -> &'static str {
        contracts::TOOL_CLASSIFY_IMAGE
    }

    fn description(&self) -> &'static str {
        contracts::CLASSIFY_IMAGE_DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        contracts::classify_image_schema()
    }

    fn invoke(&self, args: &Value) -> Result<ToolOutput> {
        let output = self.run(parse_args(args)?)?;
        let mut text = format!("Classification: {}", output.classification.join(", "));
        if let Some(confidence) = output.confidence {
            text.push_str(&format!(" (confidence {confidence:.2})"));
        }
        ToolOutput::new(text, &output)
    }
}
