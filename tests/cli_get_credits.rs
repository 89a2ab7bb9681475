mod common;

use common::Upstream;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn cli_get_credits_outputs_json() -> Result<(), Box<dyn std::error::Error>> {
    let upstream = Upstream::start();
    upstream.mount(
        Mock::given(method("GET"))
            .and(path("/credits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "remaining_credits": 1000,
                "total_credits_used": 50
            }))),
    );

    let output = common::command(&upstream)
        .args(["get-credits", "--json"])
        .output()?;

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["remaining_credits"], json!(1000));
    assert_eq!(value["total_credits_used"], json!(50));
    Ok(())
}

#[test]
fn cli_reports_upstream_error_and_exits_non_zero() -> Result<(), Box<dyn std::error::Error>> {
    let upstream = Upstream::start();
    upstream.mount(
        Mock::given(method("GET"))
            .and(path("/credits"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid API key"}))),
    );

    let output = common::command(&upstream).args(["get-credits"]).output()?;

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("401"));
    assert!(stderr.contains("Invalid API key"));
    Ok(())
}

#[test]
fn cli_rejects_zero_timeout() -> Result<(), Box<dyn std::error::Error>> {
    let upstream = Upstream::start();
    let output = common::command(&upstream)
        .args(["get-credits", "--timeout-secs", "0"])
        .output()?;

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("--timeout-secs"));
    assert_eq!(upstream.request_count(), 0);
    Ok(())
}
