//! Error types module
//!
//! This module provides the error vocabulary shared by every Unmark crate: the
//! `ErrorMetadata` trait that lets an error describe how it should be presented,
//! the `ErrorReport` handed to callers, and `ValidationError` for rejected assets.
//! Component-specific errors (publishing, removal) live in their own crates and
//! implement `ErrorMetadata`.

use serde::Serialize;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a hosting backend going down
    Warn,
    /// Error level - for failures that end a run
    Error,
}

/// Metadata for error reporting - defines how an error should be presented
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "PUBLISH_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether this error triggers a fallback path inside the pipeline
    fn is_recoverable(&self) -> bool;

    /// Human-readable message (may differ from the internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;

    /// Reduce the error to the report handed to callers
    fn report(&self) -> ErrorReport {
        ErrorReport {
            message: self.client_message(),
            recoverable: self.is_recoverable(),
        }
    }
}

/// Caller-facing error summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub message: String,
    pub recoverable: bool,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>, recoverable: bool) -> Self {
        Self {
            message: message.into(),
            recoverable,
        }
    }
}

/// Rejection reasons for a selected file. An asset that fails validation is never constructed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select an MP4 video file.")]
    UnsupportedType { name: String, content_type: String },

    #[error("File size too large. Maximum size is {max_mb}MB for processing.")]
    TooLarge { size: u64, max_mb: u64 },

    #[error("The selected file is empty.")]
    Empty { name: String },

    #[error("Could not read {path}: {message}")]
    Unreadable { path: String, message: String },
}

impl ErrorMetadata for ValidationError {
    fn error_code(&self) -> &'static str {
        match self {
            ValidationError::UnsupportedType { .. } => "UNSUPPORTED_TYPE",
            ValidationError::TooLarge { .. } => "PAYLOAD_TOO_LARGE",
            ValidationError::Empty { .. } => "EMPTY_FILE",
            ValidationError::Unreadable { .. } => "UNREADABLE_FILE",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn client_message(&self) -> String {
        self.to_string()
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Debug
    }
}

/// Render an error together with its source chain, one cause per line.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut details = err.to_string();

    let mut source = err.source();
    let mut depth = 0;
    while let Some(cause) = source {
        depth += 1;
        if depth > 5 {
            details.push_str("\n  ... (truncated)");
            break;
        }
        details.push_str(&format!("\n  Caused by: {}", cause));
        source = cause.source();
    }

    details
}
