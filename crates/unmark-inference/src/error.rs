//! Removal errors
//!
//! Non-success replies from the inference service are classified by status code.
//! Statuses without a fixed meaning fall back to the message in the reply body.

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use unmark_core::{ErrorMetadata, LogLevel};
use unmark_http::TransportError;

use crate::response::DecodeError;

const DEFAULT_FAILURE_MESSAGE: &str = "Failed to process video";

const URL_ACCESS_GUIDANCE: &str = " The video URL may not be accessible from the inference service's servers. This could be due to network restrictions or the temporary hosting service blocking API access. Try a different hosting service, or set up your own file hosting.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalErrorKind {
    Unauthorized,
    Forbidden,
    InsufficientCredit,
    RateLimited,
    BadResponse,
    DurationUndetectable,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemovalError {
    pub kind: RemovalErrorKind,
    pub message: String,
    /// HTTP status of the reply, when there was one
    pub status: Option<u16>,
}

impl RemovalError {
    pub fn new(kind: RemovalErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status.as_u16());
        self
    }

    /// Append the advice shown when the alternate URL shape did not help either.
    pub fn with_access_guidance(mut self) -> Self {
        self.message.push_str(URL_ACCESS_GUIDANCE);
        self
    }

    pub fn is_duration_undetectable(&self) -> bool {
        self.kind == RemovalErrorKind::DurationUndetectable
    }
}

impl From<TransportError> for RemovalError {
    fn from(err: TransportError) -> Self {
        RemovalError::new(
            RemovalErrorKind::Unknown,
            format!("Failed to get response from inference service: {}", err),
        )
    }
}

impl From<DecodeError> for RemovalError {
    fn from(err: DecodeError) -> Self {
        RemovalError::new(RemovalErrorKind::BadResponse, err.to_string())
    }
}

impl ErrorMetadata for RemovalError {
    fn error_code(&self) -> &'static str {
        match self.kind {
            RemovalErrorKind::Unauthorized => "REMOVAL_UNAUTHORIZED",
            RemovalErrorKind::Forbidden => "REMOVAL_FORBIDDEN",
            RemovalErrorKind::InsufficientCredit => "REMOVAL_INSUFFICIENT_CREDIT",
            RemovalErrorKind::RateLimited => "REMOVAL_RATE_LIMITED",
            RemovalErrorKind::BadResponse => "REMOVAL_BAD_RESPONSE",
            RemovalErrorKind::DurationUndetectable => "REMOVAL_DURATION_UNDETECTABLE",
            RemovalErrorKind::Unknown => "REMOVAL_FAILED",
        }
    }

    /// Only a duration failure has a fallback path (the alternate URL shape)
    fn is_recoverable(&self) -> bool {
        self.kind == RemovalErrorKind::DurationUndetectable
    }

    fn client_message(&self) -> String {
        self.message.clone()
    }

    fn log_level(&self) -> LogLevel {
        match self.kind {
            RemovalErrorKind::RateLimited | RemovalErrorKind::DurationUndetectable => {
                LogLevel::Warn
            }
            _ => LogLevel::Error,
        }
    }
}

fn mentions_duration(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("duration") || lower.contains("could not determine")
}

/// Pull a human-readable message out of an error reply.
fn body_message(status: StatusCode, body: &str) -> String {
    let parsed: JsonValue = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) => {
            return status
                .canonical_reason()
                .unwrap_or(DEFAULT_FAILURE_MESSAGE)
                .to_string()
        }
    };

    ["message", "error"]
        .iter()
        .filter_map(|field| parsed.get(*field))
        .find_map(|value| match value {
            JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
            JsonValue::Null | JsonValue::String(_) => None,
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string())
}

/// Classify a non-success reply from the inference service.
pub fn classify_failure(status: StatusCode, body: &str) -> RemovalError {
    let error = match status.as_u16() {
        401 => RemovalError::new(
            RemovalErrorKind::Unauthorized,
            "Invalid API key. Please check your UNMARK_INFERENCE_API_KEY.",
        ),
        403 => RemovalError::new(
            RemovalErrorKind::Forbidden,
            "Access forbidden. Check your API key permissions.",
        ),
        406 => RemovalError::new(
            RemovalErrorKind::InsufficientCredit,
            "Insufficient credits. Please add credits to your inference account.",
        ),
        429 => RemovalError::new(
            RemovalErrorKind::RateLimited,
            "Rate limit exceeded. Please try again later.",
        ),
        _ => {
            let message = body_message(status, body);
            let kind = if mentions_duration(&message) {
                RemovalErrorKind::DurationUndetectable
            } else {
                RemovalErrorKind::BadResponse
            };
            RemovalError::new(kind, message)
        }
    };

    error.with_status(status)
}
