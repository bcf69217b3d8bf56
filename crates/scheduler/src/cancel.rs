//! Cancellation token for cooperative decode cancellation
//!
//! Decode functions can periodically check `is_cancelled()` and stop early.
//! Cancellation is a signal, not a guarantee: a decode may still run to
//! completion after its token is cancelled, in which case the task that owns
//! the token discards the result.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cancellation token shared between a load task and its decode function.
///
/// Multiple clones observe the same underlying flag via `Arc`.
///
/// # Example
///
/// ```
/// use thumbgrid_scheduler::CancellationToken;
///
/// let token = CancellationToken::new();
/// let decoder_token = token.clone();
///
/// token.cancel();
/// assert!(decoder_token.is_cancelled());
/// ```
#[derive(Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new token in the non-cancelled state.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancel this token. Idempotent; all clones observe the cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether `cancel()` has been called on this token or any clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
