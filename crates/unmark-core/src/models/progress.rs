use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Progress percentages reached at each pipeline milestone.
pub mod milestones {
    /// Run started, about to publish
    pub const STARTED: u8 = 10;
    /// Asset published at a public URL
    pub const PUBLISHED: u8 = 30;
    /// Inference request accepted by the service
    pub const ACCEPTED: u8 = 60;
    /// Result normalized
    pub const COMPLETED: u8 = 100;
}

/// Pipeline run state. Transitions are strictly linear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    Publishing,
    Submitting,
    Completed,
    Failed,
}

impl RunState {
    /// Whether `next` is a legal successor of this state.
    pub fn can_transition_to(self, next: RunState) -> bool {
        matches!(
            (self, next),
            (RunState::Idle, RunState::Publishing)
                | (RunState::Publishing, RunState::Submitting)
                | (RunState::Publishing, RunState::Failed)
                | (RunState::Submitting, RunState::Completed)
                | (RunState::Submitting, RunState::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed)
    }
}

impl Display for RunState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Publishing => "publishing",
            RunState::Submitting => "submitting",
            RunState::Completed => "completed",
            RunState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Latest progress value. Overwritten on every transition; only the latest matters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Progress {
    pub percent: u8,
    pub status: String,
}

impl Progress {
    /// Advance to `percent`. Never moves backwards and never exceeds 100.
    pub fn advance(&mut self, percent: u8) {
        self.percent = self.percent.max(percent.min(milestones::COMPLETED));
    }

    /// Replace the status text without touching the percentage.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Back to 0 with no status, as shown after a failed run.
    pub fn clear(&mut self) {
        self.percent = 0;
        self.status.clear();
    }
}
