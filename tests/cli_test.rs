#[path = "common/mod.rs"]
mod common;

use common::ConsoleTest;
use serde_json::Value;
use std::fs;

// ============================================================================
// Config command tests
// ============================================================================

#[test]
fn test_config_show_empty() {
    let console = ConsoleTest::new();

    let output = console.run_success(&["config", "show"]);
    assert!(output.contains("Configuration"));
    assert!(output.contains("not configured"));
    assert!(output.contains("not logged in"));
}

#[test]
fn test_config_set_and_get() {
    let console = ConsoleTest::new();

    console.run_success(&["config", "set", "base_url", "https://mlm.example.com/api"]);
    console.run_success(&["config", "set", "page_size", "25"]);

    let output = console.run_success(&["config", "get", "page_size"]);
    assert_eq!(output.trim(), "25");

    let content = fs::read_to_string(console.config_path()).unwrap();
    assert!(content.contains("mlm.example.com/api"));
    assert!(content.contains("page_size: 25"));
}

#[test]
fn test_config_show_json() {
    let console = ConsoleTest::new();
    console.run_success(&["config", "set", "base_url", "http://localhost:8000/api"]);

    let output = console.run_success(&["config", "show", "--json"]);
    let json: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["base_url"], "http://localhost:8000/api");
    assert_eq!(json["page_size"], 10);
    assert_eq!(json["logged_in"], false);
}

#[test]
fn test_config_set_invalid_key() {
    let console = ConsoleTest::new();

    let stderr = console.run_failure(&["config", "set", "theme", "dark"]);
    assert!(stderr.contains("unknown config key"));
}

#[test]
fn test_config_set_zero_page_size() {
    let console = ConsoleTest::new();

    let stderr = console.run_failure(&["config", "set", "page_size", "0"]);
    assert!(stderr.contains("page_size must be at least 1"));
}

// ============================================================================
// Resource commands
// ============================================================================

#[test]
fn test_resources_json_lists_every_collection() {
    let console = ConsoleTest::new();

    let output = console.run_success(&["resources", "--json"]);
    let json: Value = serde_json::from_str(&output).unwrap();
    let keys: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys.len(), 13);
    assert!(keys.contains(&"wallet-transactions"));

    let users = &json[0];
    assert_eq!(users["update_method"], "PATCH");
    assert_eq!(users["endpoints"]["create"], "sign_up");
}

#[test]
fn test_ls_without_backend_url_fails() {
    let console = ConsoleTest::new();

    let stderr = console.run_failure(&["ls", "products"]);
    assert!(stderr.contains("backend URL not configured"));
}

#[test]
fn test_ls_unknown_resource() {
    let console = ConsoleTest::new();

    let stderr = console.run_failure(&["ls", "widgets"]);
    assert!(stderr.contains("invalid resource 'widgets'"));
}

#[test]
fn test_ls_without_login_reports_it() {
    let console = ConsoleTest::new();
    console.run_success(&["config", "set", "base_url", "http://192.0.2.1:9/api"]);

    let stderr = console.run_failure(&["ls", "categories"]);
    assert!(stderr.contains("not logged in"));
}

#[test]
fn test_create_rejects_invalid_form_before_sending() {
    let console = ConsoleTest::new();
    console.run_success(&["config", "set", "base_url", "http://192.0.2.1:9/api"]);

    let output = console
        .command(&["create", "categories", "--data", r#"{"name": "a"}"#])
        .env("MLM_CONSOLE_TOKEN", "tok")
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Validation failed"));
    assert!(stderr.contains("Name is required"));
}

#[test]
fn test_create_rejects_malformed_json() {
    let console = ConsoleTest::new();
    console.run_success(&["config", "set", "base_url", "http://192.0.2.1:9/api"]);

    let stderr = console.run_failure(&["create", "categories", "--data", "{name"]);
    assert!(stderr.contains("JSON error"));
}

// ============================================================================
// Auth commands
// ============================================================================

#[test]
fn test_login_validates_email_locally() {
    let console = ConsoleTest::new();
    console.run_success(&["config", "set", "base_url", "http://192.0.2.1:9/api"]);

    let stderr = console.run_failure(&["login", "not-an-email", "--password", "secret1"]);
    assert!(stderr.contains("Invalid email"));
}

#[test]
fn test_logout_when_not_logged_in() {
    let console = ConsoleTest::new();

    let output = console.run_success(&["logout", "--json"]);
    let json: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["removed"], false);
}
