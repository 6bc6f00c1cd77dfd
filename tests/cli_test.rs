use std::process::{Command, Output};

use httpmock::prelude::*;
use serde_json::{json, Value};

fn xlua(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_xlua"))
        .args(args)
        .env_remove("XLUA_API_KEY")
        .env_remove("XLUA_BASE_URL")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run xlua")
}

#[test]
fn prints_pretty_json_on_success() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/apps/com.example.app")
            .header("x-api-key", "k");
        then.status(200)
            .json_body(json!({ "status": "success", "packageName": "com.example.app" }));
    });
    let base_url = server.url("/api/v1");

    let output = xlua(&["--api-key", "k", "--base-url", &base_url, "get-app", "com.example.app"]);

    mock.assert();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("\n  \"packageName\": \"com.example.app\""));
    let printed: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(printed["status"], "success");
}

#[test]
fn api_key_can_come_from_environment() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/restrictions").header("x-api-key", "from-env");
        then.status(200).json_body(json!({ "restrictions": [] }));
    });

    let output = Command::new(env!("CARGO_BIN_EXE_xlua"))
        .arg("get-restrictions")
        .env("XLUA_API_KEY", "from-env")
        .env("XLUA_BASE_URL", server.url("/api/v1"))
        .output()
        .unwrap();

    mock.assert();
    assert!(output.status.success());
}

#[test]
fn error_status_exits_non_zero_and_prints_body() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE).path("/api/v1/apps/com.example.app/location");
        then.status(404).json_body(json!({
            "status": "error",
            "code": 404,
            "message": "Endpoint not found"
        }));
    });
    let base_url = server.url("/api/v1");

    let output = xlua(&[
        "--api-key",
        "k",
        "--base-url",
        &base_url,
        "reset-location",
        "com.example.app",
    ]);

    mock.assert();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("reset-location failed"));
    assert!(stderr.contains("404"));
    assert!(stderr.contains("Endpoint not found"));
}

#[test]
fn conflicting_restriction_flags_are_rejected() {
    let output = xlua(&[
        "--api-key",
        "k",
        "set-app-restriction",
        "com.example.app",
        "camera",
        "--enabled",
        "--disabled",
    ]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("cannot be used with"));
}

#[test]
fn missing_restriction_flag_is_rejected() {
    let output = xlua(&["--api-key", "k", "set-app-restriction", "com.example.app", "camera"]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn missing_api_key_is_rejected() {
    let output = xlua(&["get-apps"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("--api-key"));
}
