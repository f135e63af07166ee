//! Hooks for reporting pipeline activity
//!
//! The publisher and remover emit status text while they work. They don't know who
//! renders it; the orchestrator implements `StatusReporter` and folds the updates
//! into its progress snapshot.

/// Receiver of live status updates from pipeline components.
///
/// Updates overwrite each other: implementations keep only the latest one.
pub trait StatusReporter: Send + Sync {
    /// Replace the current status text
    fn report_status(&self, message: &str);

    /// The inference service accepted the request and its body is about to be processed
    fn report_accepted(&self) {}
}
