use crate::client::ViscribeClient;
use crate::error::{Result, ToolError};
use crate::image;
use crate::mcp::contracts;
use crate::tools::{Tool, ToolOutput, insert_optional, json_or_string, parse_args};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractImageInput {
    pub image_url: Option<String>,
    pub image_base64: Option<String>,
    pub image_path: Option<String>,
    /// Array of [`ExtractField`], natively or JSON-encoded.
    pub fields: Option<Value>,
    /// Object schema for nested extraction, natively or JSON-encoded.
    pub advanced_schema: Option<Value>,
    pub instruction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    ArrayText,
    ArrayNumber,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractImageOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits_used: Option<u64>,
    #[serde(default)]
    pub extracted_data: Option<Value>,
}

pub struct ExtractImageTool {
    client: ViscribeClient,
}

impl ExtractImageTool {
    pub fn new(client: ViscribeClient) -> Self {
        Self { client }
    }

    pub fn run(&self, input: ExtractImageInput) -> Result<ExtractImageOutput> {
        let payload = build_payload(input)?;
        let output: ExtractImageOutput = self.client.post(contracts::PATH_EXTRACT_IMAGE, &payload)?;
        match &output.extracted_data {
            Some(Value::Null) | None => Err(ToolError::response_format(
                "missing field `extracted_data`",
            )),
            Some(_) => Ok(output),
        }
    }
}

fn build_payload(input: ExtractImageInput) -> Result<Value> {
    let fields = parse_fields(input.fields)?;
    let advanced_schema = parse_advanced_schema(input.advanced_schema)?;
    match (&fields, &advanced_schema) {
        (None, None) => {
            return Err(ToolError::validation(
                "either fields or advanced_schema must be provided",
            ));
        }
        (Some(_), Some(_)) => {
            return Err(ToolError::validation(
                "provide either fields or advanced_schema, not both",
            ));
        }
        _ => {}
    }
    let image = image::normalize(
        "image",
        input.image_url.as_deref(),
        input.image_base64.as_deref(),
        input.image_path.as_deref(),
    )?;

    let mut payload = Map::new();
    image.write_into("image", &mut payload);
    if let Some(fields) = fields {
        payload.insert("fields".to_string(), json!(fields));
    }
    if let Some(schema) = advanced_schema {
        payload.insert("advanced_schema".to_string(), schema);
    }
    insert_optional(&mut payload, "instruction", input.instruction);
    Ok(Value::Object(payload))
}

pub fn parse_fields(value: Option<Value>) -> Result<Option<Vec<ExtractField>>> {
    let Some(value) = json_or_string(value, "fields")? else {
        return Ok(None);
    };
    let fields: Vec<ExtractField> = serde_json::from_value(value)
        .map_err(|err| ToolError::validation(format!("invalid fields: {err}")))?;
    if fields.iter().any(|field| field.name.trim().is_empty()) {
        return Err(ToolError::validation("every field needs a non-empty name"));
    }
    // An empty list asks for nothing, same as leaving it out.
    Ok(Some(fields).filter(|fields| !fields.is_empty()))
}

pub fn parse_advanced_schema(value: Option<Value>) -> Result<Option<Value>> {
    let Some(schema) = json_or_string(value, "advanced_schema")? else {
        return Ok(None);
    };
    let Some(obj) = schema.as_object() else {
        return Err(ToolError::validation("advanced_schema must be a JSON object"));
    };
    if obj.get("type").and_then(|value| value.as_str()) != Some("object") {
        return Err(ToolError::validation(
            "advanced_schema must have \"type\": \"object\"",
        ));
    }
    if !obj.get("properties").is_some_and(|value| value.is_object()) {
        return Err(ToolError::validation(
            "advanced_schema must have an object \"properties\"",
        ));
    }
    Ok(Some(schema))
}

impl Tool for ExtractImageTool {
    fn name(&self) -> &'static str {
        contracts::TOOL_EXTRACT_IMAGE
    }

    fn description(&self) -> &'static str {
        contracts::EXTRACT_IMAGE_DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        contracts::extract_image_schema()
    }

    fn invoke(&self, args: &Value) -> Result<ToolOutput> {
        let output = self.run(parse_args(args)?)?;
        let text = output
            .extracted_data
            .as_ref()
            .and_then(|data| serde_json::to_string_pretty(data).ok())
            .unwrap_or_default();
        ToolOutput::new(text, &output)
    }
}
