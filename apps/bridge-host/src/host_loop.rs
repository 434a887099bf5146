//! The host's main loop: owns the host state and drains the bridge queue
//! once per frame, the way an editor's timer callback would.

use bridge_core::task_queue::{DrainReport, IdleTick, TaskQueue};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::info;

/// Default time between idle ticks.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(10);

pub struct HostLoop<H> {
    host: H,
    idle: IdleTick<H>,
    frame_interval: Duration,
    stop: Arc<AtomicBool>,
}

impl<H: 'static> HostLoop<H> {
    pub fn new(host: H, queue: Arc<TaskQueue<H>>, frame_interval: Duration) -> Self {
        Self {
            host,
            idle: IdleTick::new(queue),
            frame_interval,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that ends [`HostLoop::run`] once set. Clone it to stop the loop
    /// from another thread.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// One frame: drain everything queued so far.
    pub fn tick(&mut self) -> DrainReport {
        self.idle.tick(&mut self.host);
        self.idle.last_report()
    }

    /// Ticks until the stop flag is set.
    ///
    /// `on_frame` runs after each drain with the loop's stop flag, so it can
    /// handle console commands or end the loop itself.
    pub fn run<F>(&mut self, mut on_frame: F)
    where
        F: FnMut(&mut H, &AtomicBool),
    {
        info!("Host loop running (frame interval {:?})", self.frame_interval);

        while !self.stop.load(Ordering::SeqCst) {
            self.tick();
            on_frame(&mut self.host, &self.stop);
            thread::sleep(self.frame_interval);
        }

        info!("Host loop stopped after {} frames", self.idle.ticks());
    }

    pub fn into_host(self) -> H {
        self.host
    }
}
