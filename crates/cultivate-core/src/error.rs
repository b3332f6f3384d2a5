//! # API Error Taxonomy
//!
//! Every failed API call is tagged with exactly one [`ErrorCategory`].
//! The category is derived from the HTTP status alone, except for
//! [`ErrorCategory::Network`], which applies whenever no response was
//! received at all.
//!
//! | Condition | Category |
//! |---|---|
//! | no HTTP response received | `Network` |
//! | 401 | `Authentication` |
//! | 403 | `Authorization` |
//! | 400 / 422 | `Validation` |
//! | 409 | `Conflict` |
//! | ≥ 500 | `Server` |
//! | other | `Generic` |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary classification of a failed API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// No HTTP response was received (connection refused, DNS, timeout).
    Network,
    /// The credentials were missing, invalid, or expired (401).
    Authentication,
    /// The credentials were valid but lack permission (403).
    Authorization,
    /// The request was malformed or failed input validation (400, 422).
    Validation,
    /// A business or regulatory rule rejected the request (409).
    Conflict,
    /// The server failed (5xx). The caller may retry.
    Server,
    /// Anything else.
    Generic,
}

impl ErrorCategory {
    /// All categories, in table order.
    pub const ALL: [ErrorCategory; 7] = [
        Self::Network,
        Self::Authentication,
        Self::Authorization,
        Self::Validation,
        Self::Conflict,
        Self::Server,
        Self::Generic,
    ];

    /// Classify an HTTP status code that was actually received.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Authentication,
            403 => Self::Authorization,
            400 | 422 => Self::Validation,
            409 => Self::Conflict,
            s if s >= 500 => Self::Server,
            _ => Self::Generic,
        }
    }

    /// Stable lowercase name, used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::Server => "server",
            Self::Generic => "generic",
        }
    }

    /// Message shown when the server did not provide one.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::Network => "Network error. Please check your connection.",
            Self::Authentication => "Authentication required. Please log in again.",
            Self::Authorization => "You do not have permission to perform this action.",
            Self::Validation => "The request contains invalid data.",
            Self::Conflict => "The request conflicts with a compliance rule.",
            Self::Server => "Server error. Please try again later.",
            Self::Generic => "An unexpected error occurred.",
        }
    }

    /// Whether a caller-driven retry can reasonably succeed.
    ///
    /// The client itself never retries these; only 401 is retried, after a
    /// token refresh.
    pub fn caller_may_retry(&self) -> bool {
        matches!(self, Self::Network | Self::Server)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pull a human-readable message out of an error response body.
///
/// Looks at `message`, then `error` (string), then `error.message`.
/// Returns `None` for non-JSON bodies or when none of those are present
/// and non-empty.
pub fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let candidate = value
        .get("message")
        .and_then(|v| v.as_str())
        .or_else(|| value.get("error").and_then(|v| v.as_str()))
        .or_else(|| {
            value
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|v| v.as_str())
        })?;
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_classify_as_documented() {
        assert_eq!(ErrorCategory::from_status(401), ErrorCategory::Authentication);
        assert_eq!(ErrorCategory::from_status(403), ErrorCategory::Authorization);
        assert_eq!(ErrorCategory::from_status(400), ErrorCategory::Validation);
        assert_eq!(ErrorCategory::from_status(422), ErrorCategory::Validation);
        assert_eq!(ErrorCategory::from_status(409), ErrorCategory::Conflict);
        assert_eq!(ErrorCategory::from_status(500), ErrorCategory::Server);
        assert_eq!(ErrorCategory::from_status(503), ErrorCategory::Server);
        assert_eq!(ErrorCategory::from_status(404), ErrorCategory::Generic);
        assert_eq!(ErrorCategory::from_status(429), ErrorCategory::Generic);
    }

    #[test]
    fn only_network_and_server_are_caller_retryable() {
        let retryable: Vec<_> = ErrorCategory::ALL
            .iter()
            .filter(|c| c.caller_may_retry())
            .collect();
        assert_eq!(retryable, vec![&ErrorCategory::Network, &ErrorCategory::Server]);
    }

    #[test]
    fn extract_message_prefers_top_level_message() {
        let body = r#"{"message":"Quantity exceeds license limit","error":"conflict"}"#;
        assert_eq!(
            extract_message(body).as_deref(),
            Some("Quantity exceeds license limit")
        );
    }

    #[test]
    fn extract_message_reads_nested_error_object() {
        let body = r#"{"error":{"code":422,"message":"name is required"}}"#;
        assert_eq!(extract_message(body).as_deref(), Some("name is required"));
    }

    #[test]
    fn extract_message_reads_error_string() {
        assert_eq!(
            extract_message(r#"{"error":"forbidden"}"#).as_deref(),
            Some("forbidden")
        );
    }

    #[test]
    fn extract_message_ignores_blank_and_non_json() {
        assert_eq!(extract_message(r#"{"message":"   "}"#), None);
        assert_eq!(extract_message("<html>Bad Gateway</html>"), None);
        assert_eq!(extract_message(""), None);
    }

    #[test]
    fn category_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ErrorCategory::Conflict).unwrap(),
            r#""conflict""#
        );
    }
}
