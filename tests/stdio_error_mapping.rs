mod common;

use common::{StdioServer, Upstream};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn error_of(result: &serde_json::Value) -> &serde_json::Value {
    assert_eq!(result.get("isError").and_then(|v| v.as_bool()), Some(true));
    result
        .get("structuredContent")
        .and_then(|value| value.get("error"))
        .expect("error present")
}

#[test]
fn rate_limit_surfaces_status_and_message() {
    let upstream = Upstream::start();
    upstream.mount(
        Mock::given(method("POST"))
            .and(path("/image/ask"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({"error": "rate limited"}))),
    );

    let mut server = StdioServer::spawn(&upstream);
    let result = server.call(
        1,
        "viscribe.ask_image",
        json!({ "image_url": "https://example.com/car.jpg", "question": "What color?" }),
    );

    let error = error_of(&result);
    assert_eq!(error["kind"], json!("api_error"));
    assert_eq!(error["status"], json!(429));
    assert!(error["message"].as_str().expect("message").contains("rate limited"));
}

#[test]
fn validation_failures_never_reach_upstream() {
    let upstream = Upstream::start();
    let mut server = StdioServer::spawn(&upstream);

    let result = server.call(
        1,
        "viscribe.describe_image",
        json!({
            "image_url": "https://example.com/cat.jpg",
            "image_base64": "aGVsbG8=",
            "image_path": "/tmp/cat.png"
        }),
    );
    assert_eq!(error_of(&result)["kind"], json!("validation_error"));

    let result = server.call(
        2,
        "viscribe.classify_image",
        json!({ "image_path": "/tmp/definitely-missing-viscribe-cat.png", "classes": ["cat"] }),
    );
    assert_eq!(error_of(&result)["kind"], json!("file_not_found"));

    let result = server.call(3, "viscribe.unknown", json!({}));
    assert_eq!(error_of(&result)["kind"], json!("validation_error"));

    assert_eq!(upstream.request_count(), 0);
}

#[test]
fn malformed_success_body_is_response_format_error() {
    let upstream = Upstream::start();
    upstream.mount(
        Mock::given(method("GET"))
            .and(path("/credits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"credits": "lots"}))),
    );

    let mut server = StdioServer::spawn(&upstream);
    let result = server.call(1, "viscribe.get_credits", json!({}));
    assert_eq!(error_of(&result)["kind"], json!("response_format_error"));
}
