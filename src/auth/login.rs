//! Exchange credentials for an access token.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretBox};
use serde_json::{Value, json};
use tracing::info;

use super::TokenStore;
use crate::api::ApiClient;
use crate::error::{ConsoleError, Result};
use crate::validation::{FieldErrors, is_valid_email};

const TOKEN_ENDPOINT: &str = "token";

/// Log in with email and password and persist the returned access token.
///
/// Both fields are validated locally first; nothing is sent when they fail.
pub async fn login(
    client: &ApiClient,
    store: &TokenStore,
    email: &str,
    password: &SecretBox<String>,
) -> Result<SecretBox<String>> {
    let mut errors = FieldErrors::new();
    errors.check(is_valid_email(email), "email", "Invalid email");
    errors.check(
        !password.expose_secret().is_empty(),
        "password",
        "Password is required",
    );
    errors.into_result().map_err(ConsoleError::Validation)?;

    let url = client.url(TOKEN_ENDPOINT, None)?;
    let body = json!({ "email": email.trim(), "password": password.expose_secret() });

    let response = client
        .send_anonymous(Method::POST, url, Some(&body))
        .await
        .map_err(|e| match e {
            ConsoleError::SessionExpired => ConsoleError::api(401, Some("Login failed".to_string())),
            ConsoleError::Api { status, message } => {
                ConsoleError::api(status, message.or_else(|| Some("Login failed".to_string())))
            }
            other => other,
        })?;

    let token = access_token(&response.body)
        .ok_or_else(|| ConsoleError::Other("Login failed: response had no access token".to_string()))?;
    store.save(&token)?;
    info!(path = %store.path().display(), "stored access token");
    Ok(token)
}

/// Forget the stored token. Returns whether one was present.
pub fn logout(store: &TokenStore) -> Result<bool> {
    store.clear()
}

fn access_token(body: &Value) -> Option<SecretBox<String>> {
    body.get("access")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(|s| SecretBox::new(Box::new(s.to_string())))
}
