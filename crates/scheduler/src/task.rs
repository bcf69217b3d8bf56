//! Load task lifecycle
//!
//! A load task is one cancelable unit of decode work. Its externally visible
//! state moves Created -> Running -> {Completed | Cancelled}; terminal states
//! are sticky. A task observed Cancelled never transitions to Completed, even
//! when the underlying decode finishes afterwards - the `try_complete()` CAS
//! decides exactly once whether a decode result may be published.

use crate::CancellationToken;
use std::sync::{Arc, Mutex};

/// Unique task identifier assigned at submission.
pub type TaskId = u64;

/// Lifecycle state of a load task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Submitted but not yet picked up by a worker.
    Created,

    /// A worker is executing the decode function.
    Running,

    /// The decode finished and was not cancelled. Terminal.
    Completed,

    /// The task was cancelled before or during execution. Terminal.
    Cancelled,
}

impl TaskState {
    /// Whether this state is terminal (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Cancelled)
    }
}

/// Handle to one scheduled decode.
///
/// Cheap to clone; all clones share the same state and cancellation token.
/// The pool holds one clone while the job is queued or running, the cache
/// entry that requested the decode holds another.
#[derive(Clone)]
pub struct LoadTask {
    inner: Arc<TaskInner>,
}

struct TaskInner {
    id: TaskId,
    state: Mutex<TaskState>,
    token: CancellationToken,
}

impl LoadTask {
    pub(crate) fn new(id: TaskId) -> Self {
        Self {
            inner: Arc::new(TaskInner {
                id,
                state: Mutex::new(TaskState::Created),
                token: CancellationToken::new(),
            }),
        }
    }

    /// The identifier assigned by the pool at submission.
    pub fn id(&self) -> TaskId {
        self.inner.id
    }

    /// The token the decode function should check cooperatively.
    pub fn token(&self) -> &CancellationToken {
        &self.inner.token
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        *self.inner.state.lock().unwrap()
    }

    /// Whether the task has reached Completed or Cancelled.
    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Transition Created -> Running at dequeue.
    ///
    /// Returns `false` when the task is no longer Created; in that case the
    /// worker must not invoke the decode function at all.
    pub(crate) fn try_start(&self) -> bool {
        let mut state = self.inner.state.lock().unwrap();
        if *state == TaskState::Created {
            *state = TaskState::Running;
            true
        } else {
            false
        }
    }

    /// Request cancellation.
    ///
    /// Signals the token and forces the visible state to Cancelled unless the
    /// task already completed. Idempotent; a no-op on terminal tasks.
    pub fn cancel(&self) {
        self.inner.token.cancel();
        let mut state = self.inner.state.lock().unwrap();
        if !state.is_terminal() {
            *state = TaskState::Cancelled;
        }
    }

    /// Claim the right to publish a decode result.
    ///
    /// Transitions Running -> Completed and returns `true` exactly once; any
    /// late completion of a cancelled task loses the race and must discard
    /// its result.
    pub fn try_complete(&self) -> bool {
        let mut state = self.inner.state.lock().unwrap();
        if *state == TaskState::Running {
            *state = TaskState::Completed;
            true
        } else {
            false
        }
    }

    /// Worker backstop after the job closure returns.
    ///
    /// A job that returned without settling its task (e.g. a decode failure
    /// path) is treated as completed without a result.
    pub(crate) fn finish(&self) {
        let mut state = self.inner.state.lock().unwrap();
        if *state == TaskState::Running {
            *state = TaskState::Completed;
        }
    }
}
