//! Per-key cache entry
//!
//! A cache entry owns the thumbnail holder for one key plus the current
//! in-flight load task, of which there is at most one at any time. Entries
//! are created by the store the first time a key is seen and retired by
//! reconciliation when the key disappears from the visible set.

use crate::holder::ThumbnailHolder;
use crate::store::ThumbnailKey;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use thumbgrid_scheduler::LoadTask;

/// Outcome of an `ensure_task` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskLaunch {
    /// A non-terminal task already exists; nothing was submitted.
    AlreadyInFlight,

    /// A new task was submitted and installed.
    Started,

    /// The pool declined the submission (shut down); no task exists.
    PoolUnavailable,
}

/// Holder plus task slot for one thumbnail key.
pub struct CacheEntry {
    key: ThumbnailKey,
    holder: ThumbnailHolder,
    task: Mutex<Option<LoadTask>>,
    failed: AtomicBool,
}

impl CacheEntry {
    pub(crate) fn new(key: ThumbnailKey) -> Self {
        Self {
            key,
            holder: ThumbnailHolder::new(),
            task: Mutex::new(None),
            failed: AtomicBool::new(false),
        }
    }

    /// The stable key this entry caches for.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The entry's payload slot.
    pub fn holder(&self) -> &ThumbnailHolder {
        &self.holder
    }

    /// Whether a non-terminal load task is tracked by this entry.
    pub fn task_in_flight(&self) -> bool {
        self.task
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|t| !t.is_terminal())
    }

    /// Install a new load task unless one is already in flight.
    ///
    /// The check and the submission run under the entry's task lock, so two
    /// concurrent icon requests for the same key produce exactly one task.
    /// `submit` returning `None` signals an unavailable pool.
    pub fn ensure_task<F>(&self, submit: F) -> TaskLaunch
    where
        F: FnOnce() -> Option<LoadTask>,
    {
        let mut slot = self.task.lock().unwrap();
        if slot.as_ref().is_some_and(|t| !t.is_terminal()) {
            return TaskLaunch::AlreadyInFlight;
        }
        match submit() {
            Some(task) => {
                // Anything replaced here is terminal; the live-task check
                // above is what enforces at-most-one in flight.
                slot.replace(task);
                TaskLaunch::Started
            }
            None => TaskLaunch::PoolUnavailable,
        }
    }

    /// Cancel and drop the tracked task, if any.
    pub fn cancel_task(&self) {
        if let Some(task) = self.task.lock().unwrap().take() {
            task.cancel();
        }
    }

    /// Latch a terminal decode failure; cleared only by invalidation.
    pub fn mark_failed(&self) {
        self.failed.store(true, Ordering::Release);
    }

    /// Whether the last decode attempt failed terminally.
    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    /// Reset to the never-computed state: cancel the task, drop the payload,
    /// clear the failure latch. Used when the target size changes.
    pub(crate) fn reset(&self) {
        self.cancel_task();
        self.holder.clear();
        self.failed.store(false, Ordering::Release);
    }
}
