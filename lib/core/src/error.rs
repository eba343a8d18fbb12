use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

// ── Error body ──────────────────────────────────────────────────────
//
// Every non-2xx response carries a JSON body with at least `message`.
// Validation rejections (422) add a per-field `errors` map; server
// exceptions (500) may name the exception class.

/// JSON error envelope returned by the API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,

    /// Per-field validation messages, present on 422.
    #[serde(default)]
    pub errors: BTreeMap<String, Vec<String>>,

    /// Exception class name, present on some 500s.
    #[serde(default)]
    pub exception: Option<String>,
}

impl ErrorBody {
    /// Parse from a raw JSON value; tolerant of any shape.
    pub fn from_value(value: &serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

/// Classify a failed response as an authentication failure, which tears
/// the session down (as opposed to a 403, which only notifies).
///
/// - 401 whose message mentions "token" (case-insensitive), or
/// - 500 tagged as an authentication exception, via the `exception`
///   class name or an "unauthenticated" message.
pub fn is_auth_failure(status: u16, body: &ErrorBody) -> bool {
    let message = body.message.as_deref().unwrap_or("").to_ascii_lowercase();
    match status {
        401 => message.contains("token"),
        500 => {
            let exception = body.exception.as_deref().unwrap_or("");
            exception.contains("AuthenticationException") || message.contains("unauthenticated")
        }
        _ => false,
    }
}

// ── ApiError ────────────────────────────────────────────────────────

/// Unified client-side error for API traffic.
///
/// Status-bearing variants keep the server's `message` so views can
/// surface it verbatim; `Validation` additionally keeps the per-field
/// map for form display.
#[derive(Error, Debug)]
pub enum ApiError {
    /// 401, missing or expired credentials.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// 403, authenticated but not allowed (scope/IP). Never tears down
    /// the session.
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    /// 422, the server rejected the submission; field messages attached.
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        errors: BTreeMap<String, Vec<String>>,
    },

    /// Any other non-2xx status.
    #[error("request failed ({status}): {message}")]
    Status { status: u16, message: String },

    /// The fixed request deadline elapsed.
    #[error("request timed out")]
    Timeout,

    /// Connection-level failure (DNS, refused, reset).
    #[error("network error: {0}")]
    Network(String),

    /// The response body was not the JSON we expected.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build from a failed HTTP status and its parsed body.
    pub fn from_status(status: u16, body: ErrorBody) -> Self {
        let message = body
            .message
            .clone()
            .unwrap_or_else(|| format!("request failed with status {status}"));
        match status {
            401 => ApiError::Unauthorized { message },
            403 => ApiError::Forbidden { message },
            422 => ApiError::Validation {
                message,
                errors: body.errors,
            },
            _ => ApiError::Status { status, message },
        }
    }

    /// HTTP status this error corresponds to, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Forbidden { .. } => Some(403),
            ApiError::Validation { .. } => Some(422),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, ApiError::Forbidden { .. })
    }

    /// Best-available human message for a toast, preferring the server's
    /// wording over the variant label.
    pub fn notification_message(&self) -> String {
        match self {
            ApiError::Unauthorized { message }
            | ApiError::Forbidden { message }
            | ApiError::Validation { message, .. }
            | ApiError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
