//! Thumbgrid Scheduler Library
//!
//! Fixed-size decode worker pool with cancellable load tasks.
//!
//! This crate provides the scheduling half of the thumbnail engine: a small
//! pool of worker threads dedicated to thumbnail decoding, isolated from any
//! other thread pool so decode work cannot starve or be starved by unrelated
//! work. Each submitted job is tracked by a [`LoadTask`] handle that moves
//! through the states Created -> Running -> {Completed | Cancelled}.
//!
//! # Example
//!
//! ```
//! use thumbgrid_scheduler::{DecodePool, PoolConfig};
//!
//! let pool = DecodePool::new(PoolConfig::default());
//!
//! let task = pool
//!     .submit(|task| {
//!         // Decode work goes here. Check the token cooperatively and
//!         // settle the task with try_complete() when done.
//!         if !task.token().is_cancelled() {
//!             task.try_complete();
//!         }
//!     })
//!     .expect("pool accepts jobs until shut down");
//!
//! // Cancelling is always safe; terminal states are sticky.
//! task.cancel();
//!
//! pool.shutdown_now();
//! assert!(pool.submit(|_| {}).is_none());
//! ```

mod cancel;
mod pool;
mod task;

// Re-export public API
pub use cancel::CancellationToken;
pub use pool::{DecodePool, PoolConfig, PoolStats};
pub use task::{LoadTask, TaskId, TaskState};
