//! Run progress tracking
//!
//! Each run owns a `RunTracker`: a latest-value channel holding the run state,
//! progress, status text, and error. Updates overwrite; nothing is queued. An optional
//! `RunObserver` sees every update as it happens.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use unmark_core::{milestones, ErrorReport, Progress, RunState, StatusReporter};

const STATUS_PREPARING: &str = "Preparing video for processing...";
const STATUS_SENDING: &str = "Sending request to inference service...";
const STATUS_PROCESSING: &str = "Processing video (this may take a few minutes)...";
const STATUS_DONE: &str = "Watermark removed successfully!";

/// Snapshot of a run as a UI would render it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PipelineStatus {
    pub state: RunState,
    pub progress: Progress,
    pub error: Option<ErrorReport>,
    /// Playable address of the result once the run completed
    pub result_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PipelineStatus {
    /// Idle status carrying only a message (e.g. after a file selection).
    pub fn idle(status: impl Into<String>) -> Self {
        Self {
            progress: Progress {
                percent: 0,
                status: status.into(),
            },
            updated_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// Idle status carrying only an error.
    pub fn rejected(error: ErrorReport) -> Self {
        Self {
            error: Some(error),
            updated_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    pub fn percent(&self) -> u8 {
        self.progress.percent
    }

    pub fn status_text(&self) -> &str {
        &self.progress.status
    }

    /// A run has started and not yet reached a terminal state.
    pub fn is_processing(&self) -> bool {
        self.state != RunState::Idle && !self.state.is_terminal()
    }
}

/// Hook for callers that want every update of a run.
pub trait RunObserver: Send + Sync {
    fn on_status(&self, status: &PipelineStatus);
}

/// Progress channel for one run.
pub struct RunTracker {
    sender: watch::Sender<PipelineStatus>,
    observer: Option<Arc<dyn RunObserver>>,
}

impl Default for RunTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RunTracker {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(PipelineStatus::default());
        Self {
            sender,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Receiver that always sees the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<PipelineStatus> {
        self.sender.subscribe()
    }

    pub fn snapshot(&self) -> PipelineStatus {
        self.sender.borrow().clone()
    }

    fn update(&self, apply: impl FnOnce(&mut PipelineStatus)) {
        self.sender.send_modify(|status| {
            apply(status);
            status.updated_at = Some(Utc::now());
        });

        if let Some(observer) = &self.observer {
            observer.on_status(&self.snapshot());
        }
    }

    fn transition(status: &mut PipelineStatus, next: RunState) -> bool {
        if !status.state.can_transition_to(next) {
            tracing::error!(from = %status.state, to = %next, "Illegal run state transition ignored");
            return false;
        }
        status.state = next;
        true
    }

    /// Idle → Publishing at 10%.
    pub fn begin(&self) {
        self.update(|status| {
            if !Self::transition(status, RunState::Publishing) {
                return;
            }
            status.error = None;
            status.result_url = None;
            status.progress.advance(milestones::STARTED);
            status.progress.set_status(STATUS_PREPARING);
        });
    }

    /// Publishing → Submitting at 30%.
    pub fn published(&self) {
        self.update(|status| {
            if !Self::transition(status, RunState::Submitting) {
                return;
            }
            status.progress.advance(milestones::PUBLISHED);
            status.progress.set_status(STATUS_SENDING);
        });
    }

    /// Completed at 100%, exposing the result address.
    pub fn complete(&self, result_url: &str) {
        self.update(|status| {
            if !Self::transition(status, RunState::Completed) {
                return;
            }
            status.progress.advance(milestones::COMPLETED);
            status.progress.set_status(STATUS_DONE);
            status.result_url = Some(result_url.to_string());
        });
    }

    /// Failed: progress display cleared, error set.
    pub fn fail(&self, error: ErrorReport) {
        self.update(|status| {
            if !Self::transition(status, RunState::Failed) {
                return;
            }
            status.progress.clear();
            status.error = Some(error);
        });
    }

    /// Precondition failure before the run started: state stays Idle.
    pub fn reject(&self, error: ErrorReport) {
        self.update(|status| {
            status.error = Some(error);
        });
    }
}

impl StatusReporter for RunTracker {
    fn report_status(&self, message: &str) {
        self.update(|status| status.progress.set_status(message));
    }

    fn report_accepted(&self) {
        self.update(|status| {
            status.progress.advance(milestones::ACCEPTED);
            status.progress.set_status(STATUS_PROCESSING);
        });
    }
}
