use crate::client::ViscribeClient;
use crate::error::Result;
use crate::image;
use crate::mcp::contracts;
use crate::tools::{Tool, ToolOutput, insert_optional, parse_args};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DescribeImageInput {
    pub image_url: Option<String>,
    pub image_base64: Option<String>,
    pub image_path: Option<String>,
    pub instruction: Option<String>,
    #[serde(default = "default_generate_tags")]
    pub generate_tags: bool,
}

fn default_generate_tags() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribeImageOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits_used: Option<u64>,
    #[serde(rename = "image_description", alias = "description")]
    pub description: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

pub struct DescribeImageTool {
    client: ViscribeClient,
}

impl DescribeImageTool {
    pub fn new(client: ViscribeClient) -> Self {
        Self { client }
    }

    pub fn run(&self, input: DescribeImageInput) -> Result<DescribeImageOutput> {
        let payload = build_payload(input)?;
        self.client.post(contracts::PATH_DESCRIBE_IMAGE, &payload)
    }
}

fn build_payload(input: DescribeImageInput) -> Result<Value> {
    let image = image::normalize(
        "image",
        input.image_url.as_deref(),
        input.image_base64.as_deref(),
        input.image_path.as_deref(),
    )?;

    let mut payload = Map::new();
    image.write_into("image", &mut payload);
    insert_optional(&mut payload, "instruction", input.instruction);
    payload.insert("generate_tags".to_string(), json!(input.generate_tags));
    Ok(Value::Object(payload))
}

fn render(output: &DescribeImageOutput) -> String {
    match output.tags.as_deref() {
        Some(tags) if !tags.is_empty() => {
            format!("{}\n\nTags: {}", output.description, tags.join(", "))
        }
        _ => output.description.clone(),
    }
}

impl Tool for DescribeImageTool {
    fn name(&self) -> &'static str {
        contracts::TOOL_DESCRIBE_IMAGE
    }

    fn description(&self) -> &'static str {
        contracts::DESCRIBE_IMAGE_DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        contracts::describe_image_schema()
    }

    fn invoke(&self, args: &Value) -> Result<ToolOutput> {
        let output = self.run(parse_args(args)?)?;
        ToolOutput::new(render(&output), &output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::test_support::{TEST_API_KEY, Upstream};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use std::fs;
    use tempfile::tempdir;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, ResponseTemplate};

    #[test]
    fn describe_with_tags() {
        let upstream = Upstream::start();
        upstream.mount(
            Mock::given(method("POST"))
                .and(path(contracts::PATH_DESCRIBE_IMAGE))
                .and(header("X-API-Key", TEST_API_KEY))
                .and(body_json(json!({
                    "image_url": "https://example.com/cat.jpg",
                    "generate_tags": true
                })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "description": "a cat",
                    "tags": ["animal", "cat"]
                })))
                .expect(1),
        );

        let tool = DescribeImageTool::new(upstream.client());
        let output = tool
            .invoke(&json!({
                "image_url": "https://example.com/cat.jpg",
                "generate_tags": true
            }))
            .expect("output");

        assert_eq!(output.structured["image_description"], json!("a cat"));
        assert_eq!(output.structured["tags"], json!(["animal", "cat"]));
        assert_eq!(output.text, "a cat\n\nTags: animal, cat");
        upstream.verify();
    }

    #[test]
    fn typed_run_exposes_description() {
        let upstream = Upstream::start();
        upstream.mount(
            Mock::given(method("POST"))
                .and(path(contracts::PATH_DESCRIBE_IMAGE))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "request_id": "req-1",
                    "credits_used": 1,
                    "image_description": "A cat sitting on a windowsill",
                    "tags": null
                }))),
        );

        let tool = DescribeImageTool::new(upstream.client());
        let output = tool
            .run(DescribeImageInput {
                image_url: None,
                image_base64: Some("aGVsbG8=".to_string()),
                image_path: None,
                instruction: Some("Focus on the main subject".to_string()),
                generate_tags: false,
            })
            .expect("output");

        assert_eq!(output.description, "A cat sitting on a windowsill");
        assert_eq!(output.request_id.as_deref(), Some("req-1"));
        assert_eq!(output.credits_used, Some(1));
        assert_eq!(output.tags, None);
        assert_eq!(
            upstream.single_body(),
            json!({
                "image_base64": "aGVsbG8=",
                "instruction": "Focus on the main subject",
                "generate_tags": false
            })
        );
    }

    #[test]
    fn local_path_sent_as_base64() {
        let dir = tempdir().expect("tempdir");
        let file_path = dir.path().join("cat.png");
        let bytes = b"\x89PNG\r\n\x1a\nnot really a png";
        fs::write(&file_path, bytes).expect("write");

        let upstream = Upstream::start();
        upstream.mount(
            Mock::given(method("POST"))
                .and(path(contracts::PATH_DESCRIBE_IMAGE))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!({"description": "a png"})),
                ),
        );

        let tool = DescribeImageTool::new(upstream.client());
        tool.invoke(&json!({ "image_path": file_path.to_string_lossy() }))
            .expect("output");

        let body = upstream.single_body();
        assert!(body.get("image_path").is_none());
        assert!(body.get("image_url").is_none());
        let encoded = body["image_base64"].as_str().expect("base64 field");
        assert_eq!(STANDARD.decode(encoded).expect("decode"), bytes);
        assert_eq!(body["generate_tags"], json!(true));
    }

    #[test]
    fn conflicting_sources_never_reach_upstream() {
        let upstream = Upstream::start();
        upstream.mount(
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200))
                .expect(0),
        );

        let tool = DescribeImageTool::new(upstream.client());
        let err = tool
            .invoke(&json!({
                "image_url": "https://example.com/cat.jpg",
                "image_base64": "aGVsbG8="
            }))
            .expect_err("error");
        assert!(matches!(err, ToolError::Validation(_)));

        let err = tool.invoke(&json!({ "generate_tags": true })).expect_err("error");
        assert!(matches!(err, ToolError::Validation(_)));

        assert_eq!(upstream.request_count(), 0);
        upstream.verify();
    }

    #[test]
    fn missing_file_never_reaches_upstream() {
        let upstream = Upstream::start();
        let tool = DescribeImageTool::new(upstream.client());
        let err = tool
            .invoke(&json!({ "image_path": "/tmp/definitely-missing-viscribe-cat.png" }))
            .expect_err("error");
        assert!(matches!(err, ToolError::FileNotFound { .. }));
        assert_eq!(upstream.request_count(), 0);
    }

    #[test]
    fn unknown_argument_rejected() {
        let upstream = Upstream::start();
        let tool = DescribeImageTool::new(upstream.client());
        let err = tool
            .invoke(&json!({ "image_url": "https://example.com/a.jpg", "colour": "red" }))
            .expect_err("error");
        assert!(matches!(err, ToolError::Validation(_)));
        assert_eq!(upstream.request_count(), 0);
    }

    #[test]
    fn missing_description_is_response_format_error() {
        let upstream = Upstream::start();
        upstream.mount(
            Mock::given(method("POST"))
                .and(path(contracts::PATH_DESCRIBE_IMAGE))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!({"tags": ["animal"]})),
                ),
        );

        let tool = DescribeImageTool::new(upstream.client());
        let err = tool
            .invoke(&json!({ "image_url": "https://example.com/cat.jpg" }))
            .expect_err("error");
        assert!(matches!(err, ToolError::ResponseFormat(_)));
    }

    #[test]
    fn rate_limit_is_api_error() {
        let upstream = Upstream::start();
        upstream.mount(
            Mock::given(method("POST"))
                .and(path(contracts::PATH_DESCRIBE_IMAGE))
                .respond_with(
                    ResponseTemplate::new(429).set_body_json(json!({"error": "rate limited"})),
                ),
        );

        let tool = DescribeImageTool::new(upstream.client());
        let err = tool
            .invoke(&json!({ "image_url": "https://example.com/cat.jpg" }))
            .expect_err("error");
        assert_eq!(err.status(), Some(429));
        assert!(err.to_string().contains("rate limited"));
    }
}
