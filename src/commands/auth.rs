use std::io::{self, BufRead, Write};
use std::sync::Arc;

use owo_colors::OwoColorize;
use secrecy::SecretBox;
use serde_json::json;

use super::CommandOutput;
use crate::api::ApiClient;
use crate::auth::{TokenStore, login, logout};
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::error::Result;

/// Log in and store the access token
pub async fn cmd_login(email: &str, password: Option<String>, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let store = TokenStore::default_location()?;
    let client = ApiClient::from_config(&config, Arc::new(store.clone()))?;

    let password = match password {
        Some(password) => password,
        None => prompt_password()?,
    };
    let password = SecretBox::new(Box::new(password));

    login(&client, &store, email, &password).await?;

    CommandOutput::new(json!({
        "action": "login",
        "email": email,
        "success": true,
    }))
    .with_text(format!("Logged in as {}", email.cyan()))
    .print(output)
}

/// Forget the stored access token
pub fn cmd_logout(output: OutputOptions) -> Result<()> {
    let store = TokenStore::default_location()?;
    let removed = logout(&store)?;

    let text = if removed {
        "Logged out".to_string()
    } else {
        "Not logged in".dimmed().to_string()
    };
    CommandOutput::new(json!({
        "action": "logout",
        "removed": removed,
        "success": true,
    }))
    .with_text(text)
    .print(output)
}

fn prompt_password() -> Result<String> {
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
