//! Authenticated HTTP client for the admin backend.
//!
//! # Security Note - Logging
//!
//! The access token is attached through `RedactedHeader`, whose `Display` and
//! `Debug` impls print `[REDACTED]`, and the resulting header value is marked
//! sensitive. Even with `RUST_LOG=reqwest=debug` the token does not reach logs.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header;
use reqwest::{Client, Method, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::EntityId;
use super::endpoints::endpoint_url;
use super::envelope::error_message;
use crate::auth::CredentialProvider;
use crate::config::Config;
use crate::error::{ConsoleError, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Wrapper for the bearer header value that redacts itself when formatted.
struct RedactedHeader {
    value: String,
}

impl RedactedHeader {
    fn bearer(token: &str) -> Self {
        Self {
            value: format!("Bearer {token}"),
        }
    }

    fn as_header_value(&self) -> Result<header::HeaderValue> {
        let mut value = header::HeaderValue::from_str(&self.value).map_err(|_| {
            ConsoleError::Other("stored access token contains invalid characters".to_string())
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Display for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Debug for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedactedHeader")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// A successful response: status plus the parsed body (`Null` when empty).
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Shared HTTP client bound to one backend.
pub struct ApiClient {
    http: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl ApiClient {
    /// Create a client with the default 30s timeout.
    pub fn new(base_url: Url, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        Self::with_timeout(base_url, credentials, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: Url,
        credentials: Arc<dyn CredentialProvider>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()?;

        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    /// Create a client from configuration (base URL + timeout).
    pub fn from_config(config: &Config, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        Self::with_timeout(config.base_url()?, credentials, config.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for an endpoint path, optionally ending in a record id.
    pub fn url(&self, path: &str, id: Option<EntityId>) -> Result<Url> {
        endpoint_url(&self.base_url, path, id)
    }

    pub async fn get(&self, url: Url) -> Result<ApiResponse> {
        self.execute(Method::GET, url, None, true).await
    }

    pub async fn post(&self, url: Url, body: &Value) -> Result<ApiResponse> {
        self.execute(Method::POST, url, Some(body), true).await
    }

    pub async fn delete(&self, url: Url) -> Result<ApiResponse> {
        self.execute(Method::DELETE, url, None, true).await
    }

    /// Send an authenticated request with an arbitrary method.
    pub async fn send(&self, method: Method, url: Url, body: Option<&Value>) -> Result<ApiResponse> {
        self.execute(method, url, body, true).await
    }

    /// Send a request without the bearer header (used by login).
    pub async fn send_anonymous(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        self.execute(method, url, body, false).await
    }

    /// Issue one request and map the outcome.
    ///
    /// A missing token fails locally before anything is sent. Non-2xx
    /// statuses become [`ConsoleError::Api`] (401 becomes
    /// [`ConsoleError::SessionExpired`]).
    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        authenticated: bool,
    ) -> Result<ApiResponse> {
        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        if authenticated {
            let token = self
                .credentials
                .token()
                .ok_or(ConsoleError::Unauthenticated)?;
            let auth_header = RedactedHeader::bearer(token.expose_secret());
            request = request.header(header::AUTHORIZATION, auth_header.as_header_value()?);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(method = %method, path = url.path(), "sending request");
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let body = parse_body(&bytes);
        debug!(method = %method, path = url.path(), status = status.as_u16(), "response received");

        if status == StatusCode::UNAUTHORIZED {
            return Err(ConsoleError::SessionExpired);
        }
        if !status.is_success() {
            return Err(ConsoleError::api(status.as_u16(), error_message(&body)));
        }

        Ok(ApiResponse { status, body })
    }
}

/// Parse a response body as JSON; empty bodies become `Null` and non-JSON
/// text is kept as a string.
fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;
    use serde_json::json;

    #[test]
    fn test_redacted_header_never_prints_token() {
        let header = RedactedHeader::bearer("super-secret");
        assert_eq!(header.to_string(), "[REDACTED]");
        assert!(!format!("{header:?}").contains("super-secret"));

        let value = header.as_header_value().unwrap();
        assert!(value.is_sensitive());
        assert_eq!(value.to_str().unwrap(), "Bearer super-secret");
    }

    #[test]
    fn test_redacted_header_rejects_control_characters() {
        let header = RedactedHeader::bearer("bad\ntoken");
        assert!(header.as_header_value().is_err());
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(b""), Value::Null);
        assert_eq!(parse_body(b"  \n"), Value::Null);
        assert_eq!(parse_body(br#"{"error":"nope"}"#), json!({"error": "nope"}));
        assert_eq!(
            parse_body(b"<html>Server Error</html>"),
            Value::String("<html>Server Error</html>".to_string())
        );
    }

    #[test]
    fn test_client_url_joins_base() {
        let client = ApiClient::new(
            Url::parse("http://localhost:8000/api").unwrap(),
            Arc::new(StaticToken::new("t")),
        )
        .unwrap();
        assert_eq!(
            client.url("delete_sale", Some(7)).unwrap().as_str(),
            "http://localhost:8000/api/delete_sale/7"
        );
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_network() {
        // Port 9 (discard) on an unroutable host: if a request were sent the
        // error would be a network error, not Unauthenticated.
        let client = ApiClient::new(
            Url::parse("http://192.0.2.1:9/api").unwrap(),
            Arc::new(StaticToken::none()),
        )
        .unwrap();
        let url = client.url("get_users", None).unwrap();
        let err = client.get(url).await.unwrap_err();
        assert!(matches!(err, ConsoleError::Unauthenticated));
    }
}
