//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the POS sync
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum PosSyncError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for POS sync operations
pub type Result<T> = std::result::Result<T, PosSyncError>;

/// Failure reported by a remote HTTP collaborator (token endpoint or tenant
/// API).
///
/// `payload` carries the upstream response body when the remote answered at
/// all, so it can be surfaced in the run log next to the tenant code.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct RemoteError {
    pub message: String,
    pub payload: Option<serde_json::Value>,
}

impl RemoteError {
    /// Error without an upstream body (transport failures, timeouts).
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), payload: None }
    }

    /// Error carrying the body the remote answered with.
    pub fn with_payload(message: impl Into<String>, payload: serde_json::Value) -> Self {
        Self { message: message.into(), payload: Some(payload) }
    }

    /// Upstream payload if present, otherwise the message, as a JSON value.
    pub fn detail(&self) -> serde_json::Value {
        self.payload.clone().unwrap_or_else(|| serde_json::Value::String(self.message.clone()))
    }

    /// Upstream payload rendered as text if present, otherwise the message.
    pub fn detail_text(&self) -> String {
        match &self.payload {
            Some(serde_json::Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => self.message.clone(),
        }
    }
}
