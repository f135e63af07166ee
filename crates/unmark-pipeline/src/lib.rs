//! Unmark Pipeline
//!
//! Sequences publishing and removal for one selected video and tracks the run's
//! progress for a UI to render.
//!
//! - `orchestrator`: `Pipeline::run`, the Idle → Publishing → Submitting → Completed/Failed machine
//! - `status`: per-run progress channel and observer hook
//! - `session`: selection, ephemeral URL slots, last-invocation-wins tickets
//! - `telemetry`: tracing subscriber setup

pub mod error;
pub mod orchestrator;
pub mod session;
pub mod status;
pub mod telemetry;

pub use error::PipelineError;
pub use orchestrator::Pipeline;
pub use session::Session;
pub use status::{PipelineStatus, RunObserver, RunTracker};
pub use telemetry::init_tracing;
