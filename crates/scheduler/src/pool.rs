//! Decode worker pool
//!
//! A fixed pool of worker threads that executes decode jobs in submission
//! order. The pool is constructed and owned explicitly (no process-wide
//! singleton); whoever owns it also owns shutdown. `shutdown_now()` cancels
//! all outstanding work and rejects further submissions without waiting for
//! the worker threads to exit.

use crate::task::{LoadTask, TaskState};
use log::debug;
use std::collections::VecDeque;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Configuration for the decode worker pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker threads. Default: 3, which bounds concurrent decodes
    /// without monopolizing the machine.
    pub num_workers: usize,

    /// How long an idle worker sleeps before polling the queue again.
    /// Default: 100ms.
    pub poll_interval: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_workers: 3,
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl PoolConfig {
    /// Create a configuration with the given worker count.
    pub fn new(num_workers: usize) -> Self {
        Self {
            num_workers,
            ..Default::default()
        }
    }

    /// Set the idle poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Counters for submitted versus finished work.
///
/// `cancelled` and `completed` are kept separate so that expected
/// cancellations are never conflated with real decode activity.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolStats {
    /// Jobs accepted by `submit`.
    pub submitted: u64,

    /// Tasks that reached Completed.
    pub completed: u64,

    /// Tasks that reached Cancelled.
    pub cancelled: u64,

    /// Jobs currently waiting in the queue.
    pub queued: usize,
}

/// A job together with the task handle tracking it.
struct QueuedJob {
    task: LoadTask,
    job: Box<dyn FnOnce(&LoadTask) + Send>,
}

/// State shared between the pool handle and its workers.
struct PoolShared {
    queue: Mutex<VecDeque<QueuedJob>>,
    live: Mutex<Vec<LoadTask>>,
    shutdown: AtomicBool,
    next_id: AtomicU64,
    submitted: AtomicU64,
    completed: AtomicU64,
    cancelled: AtomicU64,
    poll_interval: Duration,
}

impl PoolShared {
    /// Drain the queue, cancelling every job that never started.
    fn drain_queue(&self) {
        let drained: Vec<QueuedJob> = {
            let mut queue = self.queue.lock().unwrap();
            queue.drain(..).collect()
        };
        if !drained.is_empty() {
            for queued in &drained {
                queued.task.cancel();
            }
            self.cancelled
                .fetch_add(drained.len() as u64, Ordering::Relaxed);
            debug!("dropped {} queued decode jobs", drained.len());
        }
    }
}

/// Fixed-size pool of decode workers.
///
/// Jobs run in FIFO order. Each job receives its own [`LoadTask`] handle and
/// is expected to check the task's cancellation token cooperatively and to
/// claim completion with `try_complete()` before publishing a result.
///
/// # Example
///
/// ```
/// use thumbgrid_scheduler::{DecodePool, PoolConfig};
/// use std::time::Duration;
///
/// let pool = DecodePool::new(PoolConfig::new(2).with_poll_interval(Duration::from_millis(5)));
///
/// let task = pool.submit(|task| {
///     if task.try_complete() {
///         // publish the decode result
///     }
/// });
/// assert!(task.is_some());
/// ```
pub struct DecodePool {
    shared: Arc<PoolShared>,
    workers: Vec<Worker>,
}

impl DecodePool {
    /// Create and start a new pool.
    pub fn new(config: PoolConfig) -> Self {
        let shared = Arc::new(PoolShared {
            queue: Mutex::new(VecDeque::new()),
            live: Mutex::new(Vec::new()),
            shutdown: AtomicBool::new(false),
            next_id: AtomicU64::new(0),
            submitted: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            cancelled: AtomicU64::new(0),
            poll_interval: config.poll_interval,
        });

        let workers = (0..config.num_workers.max(1))
            .map(|id| Worker::new(id, shared.clone()))
            .collect();

        Self { shared, workers }
    }

    /// Enqueue a decode job.
    ///
    /// Returns the task handle tracking the job, or `None` when the pool has
    /// been shut down - the caller falls back to a placeholder rather than
    /// receiving an error.
    pub fn submit<F>(&self, job: F) -> Option<LoadTask>
    where
        F: FnOnce(&LoadTask) + Send + 'static,
    {
        if self.shared.shutdown.load(Ordering::Acquire) {
            return None;
        }

        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let task = LoadTask::new(id);

        {
            let mut live = self.shared.live.lock().unwrap();
            live.retain(|t| !t.is_terminal());
            live.push(task.clone());
        }
        {
            let mut queue = self.shared.queue.lock().unwrap();
            queue.push_back(QueuedJob {
                task: task.clone(),
                job: Box::new(job),
            });
        }
        self.shared.submitted.fetch_add(1, Ordering::Relaxed);

        // Lost race with a concurrent shutdown: make sure the job cannot
        // linger in the queue unobserved.
        if self.shared.shutdown.load(Ordering::Acquire) {
            self.shared.drain_queue();
            return None;
        }

        Some(task)
    }

    /// Cancel all outstanding work and reject further submissions.
    ///
    /// Queued jobs are dropped without ever running; running jobs observe a
    /// cancelled token and their results are discarded. Idempotent, and does
    /// not wait for worker threads to exit.
    pub fn shutdown_now(&self) {
        if self.shared.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }

        self.shared.drain_queue();
        let live: Vec<LoadTask> = {
            let mut live = self.shared.live.lock().unwrap();
            live.drain(..).collect()
        };
        for task in &live {
            task.cancel();
        }
        debug!("decode pool shut down, {} tasks cancelled", live.len());
    }

    /// Whether `shutdown_now()` has been called.
    pub fn is_shut_down(&self) -> bool {
        self.shared.shutdown.load(Ordering::Acquire)
    }

    /// Number of worker threads.
    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Current counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            submitted: self.shared.submitted.load(Ordering::Relaxed),
            completed: self.shared.completed.load(Ordering::Relaxed),
            cancelled: self.shared.cancelled.load(Ordering::Relaxed),
            queued: self.shared.queue.lock().unwrap().len(),
        }
    }
}

impl Drop for DecodePool {
    fn drop(&mut self) {
        self.shutdown_now();
        // Worker threads notice the flag within one poll interval and exit
        // on their own; their join handles are detached.
    }
}

/// One worker thread.
struct Worker {
    #[allow(dead_code)]
    thread: JoinHandle<()>,
}

impl Worker {
    fn new(id: usize, shared: Arc<PoolShared>) -> Self {
        let thread = thread::Builder::new()
            .name(format!("thumb-loader-{id}"))
            .spawn(move || Self::run(shared))
            .expect("failed to spawn decode worker");
        Self { thread }
    }

    /// Main worker loop: pull the next job, run it unless it was cancelled
    /// while queued, and record its terminal state.
    fn run(shared: Arc<PoolShared>) {
        loop {
            if shared.shutdown.load(Ordering::Acquire) {
                break;
            }

            let next = shared.queue.lock().unwrap().pop_front();
            match next {
                Some(queued) => {
                    if queued.task.try_start() {
                        (queued.job)(&queued.task);
                        queued.task.finish();
                    }
                    match queued.task.state() {
                        TaskState::Completed => {
                            shared.completed.fetch_add(1, Ordering::Relaxed);
                        }
                        TaskState::Cancelled => {
                            shared.cancelled.fetch_add(1, Ordering::Relaxed);
                        }
                        _ => {}
                    }
                }
                None => thread::sleep(shared.poll_interval),
            }
        }
    }
}
