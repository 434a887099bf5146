use crate::task_queue::{DrainReport, TaskQueue};

use std::sync::Arc;
use std::time::Duration;

/// Adapter between a host's idle-tick callback and a [`TaskQueue`].
///
/// The callback reschedules itself unconditionally: every tick drains the
/// queue and asks to be called again immediately. Submitters never need to
/// re-arm it.
pub struct IdleTick<H> {
    queue: Arc<TaskQueue<H>>,
    ticks: u64,
    last_report: DrainReport,
}

impl<H: 'static> IdleTick<H> {
    pub fn new(queue: Arc<TaskQueue<H>>) -> Self {
        Self {
            queue,
            ticks: 0,
            last_report: DrainReport::default(),
        }
    }

    /// Runs one drain and returns the delay before the next tick.
    pub fn tick(&mut self, host: &mut H) -> Duration {
        self.last_report = self.queue.drain(host);
        self.ticks += 1;
        Duration::ZERO
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn last_report(&self) -> DrainReport {
        self.last_report
    }
}
