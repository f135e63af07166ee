//! Data models for the pipeline
//!
//! Each sub-module covers one stage's values: the selected asset, the published URL,
//! the inference request/result, and run progress.

mod asset;
mod inference;
mod progress;
mod public_url;

pub use asset::SourceAsset;
pub use inference::{InferenceRequest, InferenceResult, OutputEncoding, ResultBlob};
pub use progress::{milestones, Progress, RunState};
pub use public_url::PublicUrl;
