//! Unmark Core Library
//!
//! This crate provides the domain models, error types, configuration, and validation
//! shared by the hosting, inference, and pipeline crates.

pub mod config;
pub mod error;
pub mod hooks;
pub mod hosting_types;
pub mod models;
pub mod object_url;
pub mod validation;

// Re-export commonly used types
pub use config::{CloudinaryConfig, Config};
pub use error::{error_chain, ErrorMetadata, ErrorReport, LogLevel, ValidationError};
pub use hooks::StatusReporter;
pub use hosting_types::HostingKind;
pub use models::{
    milestones, InferenceRequest, InferenceResult, OutputEncoding, Progress, PublicUrl, ResultBlob,
    RunState, SourceAsset,
};
pub use object_url::{ObjectUrl, ObjectUrlStore, UrlSlot};
pub use validation::AssetLimits;
