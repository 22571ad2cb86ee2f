//! Configuration commands.
//!
//! - `config show`: Display current configuration
//! - `config get`: Print a single value
//! - `config set`: Set a configuration value

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::auth::{CredentialProvider, TokenStore};
use crate::cli::OutputOptions;
use crate::config::{BACKEND_URL_ENV, Config};
use crate::error::Result;

/// Show current configuration
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let config_path = Config::config_path()?;
    let logged_in = TokenStore::default_location()?.token().is_some();

    // The env override wins, so show what requests will actually use.
    let effective_url = config.base_url().ok().map(|u| u.to_string());
    let url_from_env = std::env::var(BACKEND_URL_ENV).is_ok_and(|v| !v.is_empty());

    let json_output = json!({
        "base_url": effective_url,
        "base_url_from_env": url_from_env,
        "page_size": config.page_size,
        "search_debounce_ms": config.search_debounce_ms,
        "request_timeout_secs": config.request_timeout_secs,
        "logged_in": logged_in,
        "config_file": config_path.to_string_lossy(),
    });

    let mut text_output = String::new();
    text_output.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));

    match &effective_url {
        Some(url) if url_from_env => text_output.push_str(&format!(
            "{}: {} {}\n",
            "base_url".cyan(),
            url,
            format!("(from {BACKEND_URL_ENV})").dimmed()
        )),
        Some(url) => text_output.push_str(&format!("{}: {}\n", "base_url".cyan(), url)),
        None => text_output.push_str(&format!(
            "{}: {}\n",
            "base_url".cyan(),
            "not configured".dimmed()
        )),
    }
    text_output.push_str(&format!("{}: {}\n", "page_size".cyan(), config.page_size));
    text_output.push_str(&format!(
        "{}: {}\n",
        "search_debounce_ms".cyan(),
        config.search_debounce_ms
    ));
    text_output.push_str(&format!(
        "{}: {}\n",
        "request_timeout_secs".cyan(),
        config.request_timeout_secs
    ));

    text_output.push('\n');

    // Never print the token itself.
    let auth_status = if logged_in {
        "logged in".green().to_string()
    } else {
        "not logged in".dimmed().to_string()
    };
    text_output.push_str(&format!("{}: {}\n", "auth".cyan(), auth_status));

    text_output.push('\n');
    text_output.push_str(&format!(
        "{}",
        format!("Config file: {}", config_path.display()).dimmed()
    ));

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    let stored = config.get(key)?;
    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": stored,
        "success": true,
    }))
    .with_text(format!("Set {} to {}", key.cyan(), stored))
    .print(output)
}

/// Get a configuration value
pub fn cmd_config_get(key: &str, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let value = config.get(key)?;

    CommandOutput::new(json!({
        "key": key,
        "value": value,
    }))
    .with_text(value)
    .print(output)
}
