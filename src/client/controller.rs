//! Task identity and lifecycle control.

use std::sync::Arc;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Identity of one in-flight network task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(pub(crate) u64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to one submitted network task
///
/// Cancellation is cooperative: after [`TaskController::cancel`], the task's
/// registry entry is removed and its completion callback is never invoked.
/// Cancelling mid-chain stops only the currently outstanding leg; already
/// dispatched follow-up requests run to completion.
pub struct TaskController {
    id: TaskId,
    cancel_token: CancellationToken,
    resume_signal: Arc<Notify>,
}

impl TaskController {
    pub(crate) fn new(id: TaskId, cancel_token: CancellationToken, resume_signal: Arc<Notify>) -> Self {
        TaskController {
            id,
            cancel_token,
            resume_signal,
        }
    }

    /// The task's identity, as used in the task registry.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Start the task. Tasks are submitted suspended; the orchestrator
    /// resumes them before handing the controller out, so callers only need
    /// this after an explicit suspension of their own.
    pub fn resume(&self) {
        self.resume_signal.notify_one();
    }

    /// Cancel the task. The completion callback will not be invoked.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }
}
