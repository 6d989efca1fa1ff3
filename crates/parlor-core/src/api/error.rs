//! Structured errors for backend requests and streaming.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Categories of backend errors for consistent error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// Transport-level failure (connection refused, DNS, timeout, aborted body)
    Network,
    /// HTTP status error (4xx, 5xx) before streaming begins
    HttpStatus,
    /// Failed to decode a response (JSON parse error, invalid SSE framing)
    Parse,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Network => write!(f, "network"),
            ApiErrorKind::HttpStatus => write!(f, "http_status"),
            ApiErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured error from the backend with kind and details.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new error.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates a transport-level error with a user-facing message.
    pub fn network(details: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: "Network error: could not reach the chat backend".to_string(),
            details: Some(details.into()),
        }
    }

    /// Creates an HTTP status error, extracting a cleaner message from a
    /// JSON body (`detail` or `error.message`) when one is present.
    pub fn http_status(status: u16, body: &str) -> Self {
        let message = format!("HTTP {status}");
        let details = if body.is_empty() {
            None
        } else {
            if let Ok(json) = serde_json::from_str::<Value>(body)
                && let Some(msg) = extract_error_message(&json)
            {
                return Self {
                    kind: ApiErrorKind::HttpStatus,
                    message: format!("HTTP {status}: {msg}"),
                    details: Some(body.to_string()),
                };
            }
            Some(body.to_string())
        };
        Self {
            kind: ApiErrorKind::HttpStatus,
            message,
            details,
        }
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Parse, message)
    }
}

/// Pulls a human-readable message out of a backend error body.
fn extract_error_message(json: &Value) -> Option<&str> {
    if let Some(detail) = json.get("detail").and_then(Value::as_str) {
        return Some(detail);
    }
    json.get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for backend operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Classifies a reqwest error into the client taxonomy.
pub(crate) fn classify_reqwest_error(e: &reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::network(format!("Request timed out: {e}"))
    } else if e.is_connect() {
        ApiError::network(format!("Connection failed: {e}"))
    } else if e.is_decode() {
        ApiError::parse(format!("Failed to decode response: {e}"))
    } else {
        ApiError::network(format!("Request failed: {e}"))
    }
}
