//! Error types surfaced by the client.
//!
//! Only the terminal outcome of a logical call is reported; individual failed
//! attempts are logged and discarded by the retry loop.

use crate::context::Cancelled;
use crate::transport::TransportError;
use serde::Deserialize;
use std::fmt;

/// Terminal failure of a logical API call.
#[derive(Debug, thiserror::Error)]
pub enum LinkupError {
    /// Missing credential, malformed required field or invalid client options.
    /// Detected before any network attempt.
    #[error("linkup: {0}")]
    Config(String),
    /// Network-level failure that survived every retry.
    #[error("linkup: transport: {0}")]
    Transport(#[source] TransportError),
    /// HTTP 401. Never retried.
    #[error("linkup: unauthorized (check API key)")]
    Unauthorized,
    /// HTTP 403. Never retried.
    #[error("linkup: forbidden")]
    Forbidden,
    /// Non-2xx response whose body carried a recognizable error message.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// Non-2xx response without a usable error body.
    #[error("linkup: http {status}")]
    Http { status: u16 },
    /// The caller's deadline passed or its cancel token fired.
    #[error("linkup: call cancelled or deadline exceeded")]
    Cancelled,
    /// Success payload did not match the requested shape.
    #[error("linkup: decode response: {0}")]
    Decode(#[source] serde_json::Error),
    /// Request body could not be serialized.
    #[error("linkup: encode request: {0}")]
    Encode(#[source] serde_json::Error),
}

impl From<Cancelled> for LinkupError {
    fn from(_: Cancelled) -> Self {
        LinkupError::Cancelled
    }
}

/// Structured error decoded from a non-2xx response body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// HTTP status of the response that carried the error.
    pub status: u16,
    /// Human-readable message from the body (never empty).
    pub message: String,
    /// Opaque `details` blob, when the server sent one.
    pub details: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

impl ApiError {
    /// Parse an error body. Returns `None` unless the body is JSON with a
    /// non-empty `message`; the HTTP status is always the response's own.
    pub fn from_body(status: u16, body: &[u8]) -> Option<Self> {
        let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
        let message = parsed.message.filter(|m| !m.is_empty())?;
        Some(Self {
            status,
            message,
            details: parsed.details,
        })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "linkup api error: {} (status={})", self.message, self.status)
    }
}

impl std::error::Error for ApiError {}
