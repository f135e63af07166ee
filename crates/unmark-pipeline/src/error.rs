//! Pipeline errors
//!
//! Every failure of a run reduces to one `PipelineError`, and every `PipelineError`
//! reduces to one user-facing message.

use thiserror::Error;
use unmark_core::{ErrorMetadata, LogLevel, ValidationError};
use unmark_hosting::{HostingError, PublishError};
use unmark_inference::RemovalError;

const MISSING_CREDENTIAL_MESSAGE: &str =
    "Inference API key not configured. Please set UNMARK_INFERENCE_API_KEY in your .env file.";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{}", MISSING_CREDENTIAL_MESSAGE)]
    MissingCredential,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Removal(#[from] RemovalError),

    #[error("Please select a video file first.")]
    NoSelection,

    /// A newer selection or run replaced this one; its result was discarded
    #[error("Run superseded by a newer request")]
    Superseded,
}

impl From<HostingError> for PipelineError {
    fn from(err: HostingError) -> Self {
        PipelineError::Config(err.to_string())
    }
}

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        PipelineError::Config(format!("{:#}", err))
    }
}

impl PipelineError {
    /// Message shown to the user for this error.
    pub fn user_message(&self) -> String {
        if self.is_run_failure() {
            format!("Error processing video: {}", self)
        } else {
            self.to_string()
        }
    }

    /// Whether the error came from a pipeline run (as opposed to a precondition).
    pub fn is_run_failure(&self) -> bool {
        matches!(self, PipelineError::Publish(_) | PipelineError::Removal(_))
    }
}

impl ErrorMetadata for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            PipelineError::Validation(e) => e.error_code(),
            PipelineError::MissingCredential => "MISSING_CREDENTIAL",
            PipelineError::Config(_) => "CONFIG_ERROR",
            PipelineError::Publish(e) => e.error_code(),
            PipelineError::Removal(e) => e.error_code(),
            PipelineError::NoSelection => "NO_SELECTION",
            PipelineError::Superseded => "SUPERSEDED",
        }
    }

    /// The run is over by the time a pipeline error surfaces
    fn is_recoverable(&self) -> bool {
        false
    }

    fn client_message(&self) -> String {
        self.user_message()
    }

    fn log_level(&self) -> LogLevel {
        match self {
            PipelineError::Validation(_)
            | PipelineError::NoSelection
            | PipelineError::Superseded => LogLevel::Debug,
            PipelineError::Removal(e) => e.log_level(),
            _ => LogLevel::Error,
        }
    }
}
