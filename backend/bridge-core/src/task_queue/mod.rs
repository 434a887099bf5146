//! Cross-thread task scheduler.
//!
//! Any thread may [`TaskQueue::submit`] work; only the host thread runs it,
//! from [`TaskQueue::drain`] on its idle tick. The queue is a single FIFO
//! with a single consumer, so tasks run in exactly the order they were
//! submitted regardless of which connection submitted them.
//!
//! # Isolation
//!
//! Each task's error or panic is captured into that task's handle. Nothing
//! a task does can break out of the drain loop or skip the tasks behind it.

mod handle;
mod idle;
mod task;

pub use handle::TaskHandle;
pub use idle::IdleTick;

use crate::error::TaskError;
use task::{Runnable, Task, TaskOutcome};

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

type DrainHook = Box<dyn Fn() + Send + Sync>;

/// Counts from one [`TaskQueue::drain`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Tasks whose work ran and produced a value.
    pub executed: usize,
    /// Tasks whose work ran and returned an error or panicked.
    pub failed: usize,
    /// Tasks skipped because their handle was cancelled or dropped.
    pub skipped: usize,
}

impl DrainReport {
    pub fn total(&self) -> usize {
        self.executed + self.failed + self.skipped
    }
}

/// FIFO of work items bound for the host thread owning an `H`.
pub struct TaskQueue<H> {
    tasks: Mutex<VecDeque<Box<dyn Runnable<H>>>>,
    drain_hook: Option<DrainHook>,
    drain_registered: AtomicBool,
}

impl<H: 'static> TaskQueue<H> {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(VecDeque::new()),
            drain_hook: None,
            drain_registered: AtomicBool::new(false),
        }
    }

    /// Installs the callback that registers [`TaskQueue::drain`] with the
    /// host's idle tick. It fires once, on the first submit.
    pub fn with_drain_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.drain_hook = Some(Box::new(hook));
        self
    }

    /// Whether the drain callback has been registered with the host.
    pub fn drain_registered(&self) -> bool {
        self.drain_registered.load(Ordering::SeqCst)
    }

    /// Enqueues `work` for the host thread and returns its completion handle.
    ///
    /// Never blocks beyond the short critical section of the queue push, and
    /// never runs `work` on the calling thread.
    pub fn submit<T, F>(&self, work: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut H) -> Result<T, TaskError> + Send + 'static,
    {
        let (task, handle) = Task::new(work);
        self.lock_tasks().push_back(Box::new(task));
        self.ensure_drain_registered();
        handle
    }

    /// Runs every queued task on the calling (host) thread.
    ///
    /// Tasks submitted while draining are run in the same pass. The queue
    /// lock is released before each task runs, so a task may itself submit.
    pub fn drain(&self, host: &mut H) -> DrainReport {
        let mut report = DrainReport::default();

        loop {
            let next = self.lock_tasks().pop_front();
            let Some(task) = next else {
                break;
            };

            match task.run(host) {
                TaskOutcome::Executed => report.executed += 1,
                TaskOutcome::Failed => report.failed += 1,
                TaskOutcome::Skipped => report.skipped += 1,
            }
        }

        if report.total() > 0 {
            debug!(
                "Drained {} task(s): {} ok, {} failed, {} skipped",
                report.total(),
                report.executed,
                report.failed,
                report.skipped
            );
        }

        report
    }

    /// Number of tasks waiting for the next drain.
    pub fn pending(&self) -> usize {
        self.lock_tasks().len()
    }

    fn ensure_drain_registered(&self) {
        if self.drain_registered.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(hook) = &self.drain_hook {
            debug!("Registering task queue drain with host idle tick");
            hook();
        }
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, VecDeque<Box<dyn Runnable<H>>>> {
        self.tasks.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}

impl<H: 'static> Default for TaskQueue<H> {
    fn default() -> Self {
        Self::new()
    }
}
