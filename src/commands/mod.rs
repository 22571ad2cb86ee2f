//! Command implementations behind the CLI.
//!
//! Every `cmd_*` function loads what it needs, does one thing and prints
//! either text or JSON depending on [`OutputOptions`].

mod auth;
mod collection;
mod config;
mod package;
mod resources;

pub use auth::{cmd_login, cmd_logout};
pub use collection::{ListOptions, cmd_create, cmd_delete, cmd_ls, cmd_options, cmd_update};
pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use package::{
    cmd_package_add_products, cmd_package_add_trainings, cmd_package_products,
    cmd_package_trainings,
};
pub use resources::cmd_resources;

use std::sync::Arc;

use serde_json::Value;

use crate::api::ApiClient;
use crate::auth::TokenStore;
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::display::format_notification;
use crate::error::Result;
use crate::notify::{Notification, Notifier};

/// Print pretty JSON to stdout.
pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// A command result with a JSON form and an optional text form.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Print JSON when requested, otherwise the text (if any).
    pub fn print(self, output: OutputOptions) -> Result<()> {
        if output.json {
            return print_json(&self.json);
        }
        if let Some(text) = self.text
            && !text.is_empty()
        {
            println!("{text}");
        }
        Ok(())
    }
}

/// Writes notifications to stderr so they never mix with JSON on stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        eprintln!("{}", format_notification(&notification));
    }
}

/// Load the config and build an authenticated client from it.
pub(crate) fn connect() -> Result<(Config, Arc<ApiClient>)> {
    let config = Config::load()?;
    let store = TokenStore::default_location()?;
    let client = ApiClient::from_config(&config, Arc::new(store))?;
    Ok((config, Arc::new(client)))
}
