//! Unmark Inference Library
//!
//! Submits a published video URL to the watermark-removal service and normalizes
//! whatever comes back into an `InferenceResult`.
//!
//! - `endpoint`: ordered endpoint versions tried until one exists
//! - `error`: status-code classification into `RemovalError`
//! - `response`: JSON-or-binary body detection
//! - `remover`: the request flow, including the one-shot URL-shape retry

pub mod endpoint;
pub mod error;
pub mod remover;
pub mod response;

pub use endpoint::{EndpointChain, EndpointDescriptor};
pub use error::{classify_failure, RemovalError, RemovalErrorKind};
pub use remover::Remover;
pub use response::{classify_body, BodyShape, DecodeError, RESULT_URL_FIELDS};
