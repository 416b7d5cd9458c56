//! API-specific error types
//!
//! Classifies failures of the token endpoint and tenant API calls and keeps
//! whatever body the remote answered with.

use std::time::Duration;

use possync_domain::RemoteError;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Categories of API errors, used for log fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Authentication errors (401, 403)
    Authentication,
    /// Server errors (5xx)
    Server,
    /// Client errors (4xx except auth)
    Client,
    /// Network/connection errors and timeouts
    Network,
    /// Bad request construction or unusable responses
    Config,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed: HTTP {status}")]
    Auth { status: u16, body: Option<Value> },

    #[error("Server error: HTTP {status}")]
    Server { status: u16, body: Option<Value> },

    #[error("Client error: HTTP {status}")]
    Client { status: u16, body: Option<Value> },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Classify a non-success status, keeping the response body.
    pub fn from_status(status: StatusCode, body: Option<Value>) -> Self {
        let status = status.as_u16();
        match status {
            401 | 403 => Self::Auth { status, body },
            500..=599 => Self::Server { status, body },
            _ => Self::Client { status, body },
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth { .. } => ApiErrorCategory::Authentication,
            Self::Server { .. } => ApiErrorCategory::Server,
            Self::Client { .. } => ApiErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::InvalidResponse(_) | Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    /// Body returned by the remote, when it answered with one
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Auth { body, .. } | Self::Server { body, .. } | Self::Client { body, .. } => {
                body.as_ref()
            }
            _ => None,
        }
    }
}

impl From<ApiError> for RemoteError {
    fn from(err: ApiError) -> Self {
        match err.body().cloned() {
            Some(body) => RemoteError::with_payload(err.to_string(), body),
            None => RemoteError::new(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, None).category(),
            ApiErrorCategory::Authentication
        );
        assert_eq!(
            ApiError::from_status(StatusCode::FORBIDDEN, None).category(),
            ApiErrorCategory::Authentication
        );
        assert_eq!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, None).category(),
            ApiErrorCategory::Server
        );
        assert_eq!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, None).category(),
            ApiErrorCategory::Client
        );
        assert_eq!(
            ApiError::Timeout(Duration::from_secs(10)).category(),
            ApiErrorCategory::Network
        );
    }

    #[test]
    fn test_remote_error_keeps_body() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, Some(json!({ "error": "bad" })));
        let remote = RemoteError::from(err);

        assert_eq!(remote.message, "Client error: HTTP 400");
        assert_eq!(remote.payload, Some(json!({ "error": "bad" })));
    }

    #[test]
    fn test_remote_error_without_body_uses_message() {
        let remote = RemoteError::from(ApiError::Network("connection reset".into()));

        assert_eq!(remote.payload, None);
        assert_eq!(remote.detail_text(), "Network error: connection reset");
    }
}
