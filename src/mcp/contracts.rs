use serde_json::{Map, Value, json};

pub const TOOL_DESCRIBE_IMAGE: &str = "viscribe.describe_image";
pub const TOOL_EXTRACT_IMAGE: &str = "viscribe.extract_image";
pub const TOOL_CLASSIFY_IMAGE: &str = "viscribe.classify_image";
pub const TOOL_ASK_IMAGE: &str = "viscribe.ask_image";
pub const TOOL_COMPARE_IMAGES: &str = "viscribe.compare_images";
pub const TOOL_GET_CREDITS: &str = "viscribe.get_credits";
pub const TOOL_SUBMIT_FEEDBACK: &str = "viscribe.submit_feedback";

pub const TOOL_NAMES: [&str; 7] = [
    TOOL_DESCRIBE_IMAGE,
    TOOL_EXTRACT_IMAGE,
    TOOL_CLASSIFY_IMAGE,
    TOOL_ASK_IMAGE,
    TOOL_COMPARE_IMAGES,
    TOOL_GET_CREDITS,
    TOOL_SUBMIT_FEEDBACK,
];

pub const PATH_DESCRIBE_IMAGE: &str = "/image/describe";
pub const PATH_EXTRACT_IMAGE: &str = "/image/extract";
pub const PATH_CLASSIFY_IMAGE: &str = "/image/classify";
pub const PATH_ASK_IMAGE: &str = "/image/ask";
pub const PATH_COMPARE_IMAGES: &str = "/image/compare";
pub const PATH_CREDITS: &str = "/credits";
pub const PATH_FEEDBACK: &str = "/feedback";

pub const DESCRIBE_IMAGE_DESCRIPTION: &str = "Generate natural language descriptions and tags for an image. \
Useful for understanding image content, creating alt text, accessibility, and image cataloging. \
Takes an image URL, a base64-encoded image, or the path to a local image file.";

pub const EXTRACT_IMAGE_DESCRIPTION: &str = "Extract structured data from images (receipts, documents, forms, screenshots, etc.). \
Supports simple fields (name, type, description) or complex JSON schemas for nested structures. \
Takes an image URL, a base64-encoded image, or the path to a local image file.";

pub const CLASSIFY_IMAGE_DESCRIPTION: &str = "Classify images into predefined categories. \
Supports single-label or multi-label classification. \
Takes an image URL, a base64-encoded image, or the path to a local image file.";

pub const ASK_IMAGE_DESCRIPTION: &str = "Ask questions about an image and get natural language answers (visual question answering). \
Takes an image URL, a base64-encoded image, or the path to a local image file.";

pub const COMPARE_IMAGES_DESCRIPTION: &str = "Compare two images and describe their similarities and differences. \
Each image can be provided as a URL, a base64-encoded string, or the path to a local image file.";

pub const GET_CREDITS_DESCRIPTION: &str =
    "Get the remaining credits and total credits used on the Viscribe account. No parameters required.";

pub const SUBMIT_FEEDBACK_DESCRIPTION: &str = "Submit feedback on a previous Viscribe response. \
Requires the request_id returned by that call and a rating from 1 to 5.";

pub const DEFAULT_COMPARE_INSTRUCTION: &str =
    "Describe the similarities and differences between these two images.";

pub const FIELD_TYPES: [&str; 4] = ["text", "number", "array_text", "array_number"];

fn image_properties(slot: &str, label: &str) -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        format!("{slot}_url"),
        json!({ "type": "string", "description": format!("URL of {label}.") }),
    );
    properties.insert(
        format!("{slot}_base64"),
        json!({ "type": "string", "description": format!("Base64-encoded contents of {label}.") }),
    );
    properties.insert(
        format!("{slot}_path"),
        json!({
            "type": "string",
            "description": format!("Path to a local file holding {label}; it is read and sent as base64.")
        }),
    );
    properties
}

fn one_of_image(slot: &str) -> Value {
    json!([
        { "required": [format!("{slot}_url")] },
        { "required": [format!("{slot}_base64")] },
        { "required": [format!("{slot}_path")] }
    ])
}

fn object_schema(properties: Map<String, Value>, extra: Value) -> Value {
    let mut schema = json!({
        "type": "object",
        "properties": properties,
        "additionalProperties": false
    });
    if let (Some(schema), Some(extra)) = (schema.as_object_mut(), extra.as_object()) {
        for (key, value) in extra {
            schema.insert(key.clone(), value.clone());
        }
    }
    schema
}

pub fn describe_image_schema() -> Value {
    let mut properties = image_properties("image", "the image to describe");
    properties.insert("instruction".to_string(), json!({ "type": "string" }));
    properties.insert(
        "generate_tags".to_string(),
        json!({ "type": "boolean", "default": true }),
    );
    object_schema(properties, json!({ "oneOf": one_of_image("image") }))
}

pub fn extract_image_schema() -> Value {
    let mut properties = image_properties("image", "the image to extract data from");
    properties.insert(
        "fields".to_string(),
        json!({
            "description": "Simple fields to extract, as an array or a JSON-encoded array.",
            "type": ["array", "string"],
            "items": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "type": { "type": "string", "enum": FIELD_TYPES },
                    "description": { "type": "string" }
                },
                "required": ["name", "type"]
            }
        }),
    );
    properties.insert(
        "advanced_schema".to_string(),
        json!({
            "description": "JSON schema with \"type\": \"object\" and \"properties\" for nested extraction, as an object or a JSON-encoded string.",
            "type": ["object", "string"]
        }),
    );
    properties.insert("instruction".to_string(), json!({ "type": "string" }));
    object_schema(
        properties,
        json!({
            "allOf": [
                { "oneOf": one_of_image("image") },
                {
                    "oneOf": [
                        { "required": ["fields"] },
                        { "required": ["advanced_schema"] }
                    ]
                }
            ]
        }),
    )
}

pub fn classify_image_schema() -> Value {
    let mut properties = image_properties("image", "the image to classify");
    properties.insert(
        "classes".to_string(),
        json!({
            "description": "Class names to classify into, as an array or a JSON-encoded array.",
            "type": ["array", "string"],
            "items": { "type": "string" }
        }),
    );
    properties.insert(
        "class_descriptions".to_string(),
        json!({
            "description": "Map of class name to description, as an object or a JSON-encoded string.",
            "type": ["object", "string"]
        }),
    );
    properties.insert("instruction".to_string(), json!({ "type": "string" }));
    properties.insert(
        "multi_label".to_string(),
        json!({ "type": "boolean", "default": false }),
    );
    object_schema(
        properties,
        json!({ "required": ["classes"], "oneOf": one_of_image("image") }),
    )
}

pub fn ask_image_schema() -> Value {
    let mut properties = image_properties("image", "the image to ask about");
    properties.insert(
        "question".to_string(),
        json!({ "type": "string", "minLength": 1 }),
    );
    object_schema(
        properties,
        json!({ "required": ["question"], "oneOf": one_of_image("image") }),
    )
}

pub fn compare_images_schema() -> Value {
    let mut properties = image_properties("image1", "the first image");
    properties.extend(image_properties("image2", "the second image"));
    properties.insert(
        "instruction".to_string(),
        json!({ "type": "string", "default": DEFAULT_COMPARE_INSTRUCTION }),
    );
    object_schema(
        properties,
        json!({
            "allOf": [
                { "oneOf": one_of_image("image1") },
                { "oneOf": one_of_image("image2") }
            ]
        }),
    )
}

pub fn get_credits_schema() -> Value {
    object_schema(Map::new(), json!({}))
}

pub fn submit_feedback_schema() -> Value {
    let mut properties = Map::new();
    properties.insert(
        "request_id".to_string(),
        json!({ "type": "string", "minLength": 1 }),
    );
    properties.insert(
        "rating".to_string(),
        json!({ "type": "integer", "minimum": 1, "maximum": 5 }),
    );
    properties.insert("feedback_text".to_string(), json!({ "type": "string" }));
    object_schema(properties, json!({ "required": ["request_id", "rating"] }))
}
