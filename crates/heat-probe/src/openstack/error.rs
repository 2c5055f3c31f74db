//! OpenStack API error classification
//!
//! Maps HTTP status codes and OpenStack error bodies onto typed errors so
//! that callers can decide on retry and cleanup behaviour with `matches!`
//! instead of string matching.

use reqwest::StatusCode;
use thiserror::Error;

/// OpenStack API error categories for retry and cleanup logic
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource was not found (safe to skip in cleanup)
    #[error("Resource not found: {resource_type} '{resource_id}'")]
    NotFound {
        resource_type: &'static str,
        resource_id: String,
    },

    /// Token rejected or lacking permission
    #[error("Not authorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Request conflicts with the current resource state
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Rate limit exceeded (retryable with backoff)
    #[error("Rate limit exceeded")]
    Throttled,

    /// Service temporarily unavailable (retryable)
    #[error("Service unavailable ({status})")]
    Unavailable { status: u16 },

    /// Any other unsuccessful HTTP status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Connection-level failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not have the expected shape
    #[error("Unexpected response from {service}: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Throttled | ApiError::Unavailable { .. } => true,
            ApiError::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Classify an unsuccessful HTTP response.
///
/// `resource_type` and `resource_id` only feed the `NotFound` variant.
pub fn classify_status(
    status: StatusCode,
    body: &str,
    resource_type: &'static str,
    resource_id: &str,
) -> ApiError {
    let message = error_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    });

    match status.as_u16() {
        404 => ApiError::NotFound {
            resource_type,
            resource_id: resource_id.to_string(),
        },
        401 | 403 => ApiError::Unauthorized {
            status: status.as_u16(),
            message,
        },
        409 => ApiError::Conflict { message },
        413 | 429 => ApiError::Throttled,
        502..=504 => ApiError::Unavailable {
            status: status.as_u16(),
        },
        code => ApiError::Http {
            status: code,
            message,
        },
    }
}

/// Extract the human-readable message from an OpenStack error body.
///
/// Services wrap the message differently: Heat uses
/// `{"error": {"message": ..}}`, Nova and Cinder use a fault name as key
/// (`{"itemNotFound": {"message": .., "code": 404}}`), and some endpoints
/// return a bare `{"message": ..}`.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    if let Some(message) = object.get("message").and_then(|m| m.as_str()) {
        return Some(message.to_string());
    }

    object
        .values()
        .filter_map(|v| v.get("message"))
        .find_map(|m| m.as_str())
        .map(str::to_string)
}
