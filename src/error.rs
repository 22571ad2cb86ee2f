use thiserror::Error;

use crate::controller::ModalMode;
use crate::validation::FieldErrors;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("not logged in: no access token available")]
    Unauthenticated,

    #[error("session expired: log in again")]
    SessionExpired,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error (HTTP {status}){}", .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Api { status: u16, message: Option<String> },

    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("modal mode '{0}' requires a selected record")]
    MissingSelection(ModalMode),

    #[error("nothing to submit in modal mode '{0}'")]
    NothingToSubmit(ModalMode),

    #[error("another submission is still in progress")]
    SubmitInProgress,

    #[error("invalid {kind} '{value}', expected one of: {}", .expected.join(", "))]
    InvalidChoice {
        kind: &'static str,
        value: String,
        expected: &'static [&'static str],
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Verb used when rendering a failure for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn verb(self) -> &'static str {
        match self {
            Operation::Fetch => "fetch",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            Operation::Fetch => "fetched",
            Operation::Create => "created",
            Operation::Update => "updated",
            Operation::Delete => "deleted",
        }
    }
}

impl ConsoleError {
    /// Build an API error from a status code and an optional server message.
    pub fn api(status: u16, message: Option<String>) -> Self {
        ConsoleError::Api {
            status,
            message: message.filter(|m| !m.trim().is_empty()),
        }
    }

    /// True for transport-level failures (DNS, connect, timeout, reset).
    pub fn is_network(&self) -> bool {
        matches!(self, ConsoleError::Network(_))
    }

    /// Text for the single notification shown when `op` on `label` fails.
    ///
    /// A message supplied by the server wins over the generic wording.
    pub fn user_message(&self, op: Operation, label: &str) -> String {
        match self {
            ConsoleError::Api {
                message: Some(message),
                ..
            } => message.clone(),
            ConsoleError::Api {
                status,
                message: None,
            } => format!("Failed to {} {} (HTTP {})", op.verb(), label, status),
            ConsoleError::Network(_) => {
                format!("Couldn't {} {}: network error", op.verb(), label)
            }
            ConsoleError::Unauthenticated => {
                format!("Couldn't {} {}: you are not logged in", op.verb(), label)
            }
            ConsoleError::SessionExpired => {
                format!("Couldn't {} {}: session expired", op.verb(), label)
            }
            other => format!("Couldn't {} {}: {}", op.verb(), label, other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_preferred() {
        let err = ConsoleError::api(400, Some("Category already exists".to_string()));
        assert_eq!(
            err.user_message(Operation::Create, "category"),
            "Category already exists"
        );
    }

    #[test]
    fn test_blank_server_message_is_dropped() {
        let err = ConsoleError::api(500, Some("   ".to_string()));
        assert_eq!(
            err.user_message(Operation::Delete, "product"),
            "Failed to delete product (HTTP 500)"
        );
    }

    #[test]
    fn test_unauthenticated_message() {
        let msg = ConsoleError::Unauthenticated.user_message(Operation::Fetch, "sales");
        assert!(msg.contains("not logged in"));
        assert!(msg.starts_with("Couldn't fetch sales"));
    }

    #[test]
    fn test_api_display_includes_message() {
        let err = ConsoleError::api(404, Some("Not found".to_string()));
        assert_eq!(err.to_string(), "API error (HTTP 404): Not found");

        let err = ConsoleError::api(502, None);
        assert_eq!(err.to_string(), "API error (HTTP 502)");
    }
}
