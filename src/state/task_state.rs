/// Task state definitions for tracking a crawl task through its lifecycle
///
/// A task moves `Queued -> Dispatched -> Fetching -> Succeeded | Failed`,
/// or leaves `Dispatched` early as `Skipped` without any network call.
/// A fetch that redirected onto an already visited URL also ends as
/// `Skipped`, with nothing stored.
use crate::NetrError;
use std::fmt;

/// Represents the current state of a crawl task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// Task is admitted and waiting in the frontier
    Queued,

    /// A worker has pulled the task from the frontier
    Dispatched,

    /// Politeness approved the task and the HTTP request is in flight
    Fetching,

    // ===== Terminal States =====
    /// Page fetched with HTTP 200 and extracted into a record
    Succeeded,

    /// Network error, non-200 status or extraction failure
    Failed,

    /// Bound exceeded, robots denial or shutdown before the request, or a
    /// redirect onto an already visited URL
    Skipped,
}

impl TaskState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Skipped)
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Dispatched)
                | (Self::Dispatched, Self::Skipped)
                | (Self::Dispatched, Self::Fetching)
                | (Self::Fetching, Self::Succeeded)
                | (Self::Fetching, Self::Failed)
                | (Self::Fetching, Self::Skipped)
        )
    }

    /// Moves to `next`, rejecting illegal transitions
    ///
    /// ```
    /// use netr::TaskState;
    ///
    /// let state = TaskState::Queued.transition(TaskState::Dispatched).unwrap();
    /// assert!(state.transition(TaskState::Succeeded).is_err());
    /// ```
    pub fn transition(self, next: TaskState) -> Result<TaskState, NetrError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(NetrError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Dispatched => "dispatched",
            Self::Fetching => "fetching",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
