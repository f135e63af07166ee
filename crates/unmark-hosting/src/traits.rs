//! Hosting backend trait
//!
//! This module defines the HostingBackend trait that every file-hosting service must
//! implement. Backends are interchangeable; the publisher only cares about their order.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use unmark_core::{ErrorMetadata, HostingKind, LogLevel, SourceAsset};
use unmark_http::TransportError;

/// Hosting operation errors
#[derive(Debug, Error)]
pub enum HostingError {
    #[error("Upload rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid URL returned: {0}")]
    InvalidUrl(String),

    #[error("Upload timeout after {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ErrorMetadata for HostingError {
    fn error_code(&self) -> &'static str {
        match self {
            HostingError::Rejected { .. } => "HOSTING_REJECTED",
            HostingError::MalformedResponse(_) => "HOSTING_MALFORMED_RESPONSE",
            HostingError::InvalidUrl(_) => "HOSTING_INVALID_URL",
            HostingError::Timeout(_) => "HOSTING_TIMEOUT",
            HostingError::InvalidRequest(_) => "HOSTING_INVALID_REQUEST",
            HostingError::Transport(_) => "HOSTING_TRANSPORT",
            HostingError::ConfigError(_) => "HOSTING_CONFIG",
        }
    }

    /// A failed backend only moves the publisher on to the next one
    fn is_recoverable(&self) -> bool {
        !matches!(self, HostingError::ConfigError(_))
    }

    fn client_message(&self) -> String {
        self.to_string()
    }

    fn log_level(&self) -> LogLevel {
        match self {
            HostingError::ConfigError(_) => LogLevel::Error,
            _ => LogLevel::Warn,
        }
    }
}

/// Result type for hosting operations
pub type HostingResult<T> = Result<T, HostingError>;

/// File-hosting backend trait
///
/// `submit` uploads the asset and returns the address the service reported. The
/// publisher validates that address; backends only check their own reply format.
#[async_trait]
pub trait HostingBackend: Send + Sync {
    /// Service name shown in status messages
    fn name(&self) -> &str;

    /// Which service this is, used to pick URL-shape transforms
    fn kind(&self) -> HostingKind;

    /// Upload the asset and return its public URL
    async fn submit(&self, asset: &SourceAsset) -> HostingResult<String>;
}
