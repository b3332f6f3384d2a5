//! API client error types.
//!
//! Every variant maps to exactly one [`ErrorCategory`]. Callers that only
//! care about the taxonomy use [`ApiError::category`]; callers that need to
//! react to a dead session match [`ApiError::SessionExpired`].

use cultivate_core::ErrorCategory;

use crate::config::ConfigError;
use crate::storage::StorageError;

/// Errors from API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No HTTP response was received.
    #[error("network error calling {endpoint}: {source}")]
    Network {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("{endpoint} returned {status} ({category}): {message}")]
    Status {
        endpoint: String,
        category: ErrorCategory,
        status: u16,
        message: String,
    },

    /// A 401 could not be recovered by refreshing: the refresh call failed
    /// and stored credentials were cleared. The caller should send the user
    /// back to login.
    #[error("session expired calling {endpoint}: {message}")]
    SessionExpired { endpoint: String, message: String },

    /// A 2xx body did not decode into the expected type.
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },

    /// A request body could not be serialized.
    #[error("failed to encode request body for {endpoint}: {source}")]
    Encode {
        endpoint: String,
        source: serde_json::Error,
    },

    /// The request path could not be joined onto the base URL.
    #[error("invalid request path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// Credential storage failed.
    #[error("credential storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ApiError {
    /// Build a [`ApiError::Status`] from a received status and its body.
    pub(crate) fn from_response(endpoint: impl Into<String>, status: u16, body: &str) -> Self {
        let category = ErrorCategory::from_status(status);
        let message = cultivate_core::extract_message(body)
            .unwrap_or_else(|| category.default_message().to_string());
        Self::Status {
            endpoint: endpoint.into(),
            category,
            status,
            message,
        }
    }

    /// The primary category of this failure.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network { .. } => ErrorCategory::Network,
            Self::Status { category, .. } => *category,
            Self::SessionExpired { .. } => ErrorCategory::Authentication,
            Self::Decode { .. }
            | Self::Encode { .. }
            | Self::InvalidPath { .. }
            | Self::Storage(_)
            | Self::Config(_) => ErrorCategory::Generic,
        }
    }

    /// HTTP status code, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::SessionExpired { .. } => Some(401),
            _ => None,
        }
    }

    /// Human-readable message suitable for a notification.
    pub fn message(&self) -> String {
        match self {
            Self::Status { message, .. } | Self::SessionExpired { message, .. } => message.clone(),
            Self::Network { .. } => ErrorCategory::Network.default_message().to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the session is gone and the user must log in again.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }

    /// A plain 401 that the refresh path may still recover.
    pub(crate) fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }

    /// Turn a 401 into the session-expired signal, keeping its message.
    pub(crate) fn into_session_expired(self) -> Self {
        match self {
            Self::Status {
                endpoint, message, ..
            } => Self::SessionExpired { endpoint, message },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_response_uses_server_message() {
        let err = ApiError::from_response(
            "POST /inventory",
            409,
            r#"{"error":{"code":409,"message":"METRC tag already assigned"}}"#,
        );
        assert_eq!(err.category(), ErrorCategory::Conflict);
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.message(), "METRC tag already assigned");
    }

    #[test]
    fn from_response_falls_back_to_category_default() {
        let err = ApiError::from_response("GET /facilities", 503, "upstream unavailable");
        assert_eq!(err.category(), ErrorCategory::Server);
        assert_eq!(err.message(), ErrorCategory::Server.default_message());
    }

    #[test]
    fn session_expired_is_an_authentication_failure() {
        let err = ApiError::from_response("GET /auth/me", 401, r#"{"message":"jwt expired"}"#);
        assert!(err.is_unauthorized());
        let expired = err.into_session_expired();
        assert!(expired.is_session_expired());
        assert_eq!(expired.category(), ErrorCategory::Authentication);
        assert_eq!(expired.status(), Some(401));
        assert_eq!(expired.message(), "jwt expired");
    }

    #[test]
    fn non_401_status_is_not_unauthorized() {
        for status in [400, 403, 409, 422, 500] {
            assert!(!ApiError::from_response("GET /x", status, "").is_unauthorized());
        }
    }
}
