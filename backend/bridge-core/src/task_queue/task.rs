use crate::error::TaskError;
use crate::task_queue::TaskHandle;

use std::any::Any;
use std::marker::PhantomData;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::error;
use tokio::sync::oneshot;

pub(crate) enum TaskOutcome {
    Executed,
    Failed,
    Skipped,
}

/// Type-erased task as stored in the queue.
pub(crate) trait Runnable<H>: Send {
    fn run(self: Box<Self>, host: &mut H) -> TaskOutcome;
}

pub(crate) struct Task<H, T, F> {
    work: F,
    sender: oneshot::Sender<Result<T, TaskError>>,
    cancelled: Arc<AtomicBool>,
    host: PhantomData<fn(&mut H)>,
}

impl<H, T, F> Task<H, T, F>
where
    T: Send + 'static,
    F: FnOnce(&mut H) -> Result<T, TaskError> + Send + 'static,
{
    pub(crate) fn new(work: F) -> (Self, TaskHandle<T>) {
        let (sender, receiver) = oneshot::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let task = Self {
            work,
            sender,
            cancelled: Arc::clone(&cancelled),
            host: PhantomData,
        };
        (task, TaskHandle::new(receiver, cancelled))
    }
}

impl<H, T, F> Runnable<H> for Task<H, T, F>
where
    T: Send + 'static,
    F: FnOnce(&mut H) -> Result<T, TaskError> + Send + 'static,
{
    fn run(self: Box<Self>, host: &mut H) -> TaskOutcome {
        let Task {
            work,
            sender,
            cancelled,
            ..
        } = *self;

        // A closed sender means the handle was dropped: nobody is waiting.
        if cancelled.load(Ordering::SeqCst) || sender.is_closed() {
            return TaskOutcome::Skipped;
        }

        let result = match catch_unwind(AssertUnwindSafe(|| work(host))) {
            Ok(result) => result,
            Err(payload) => Err(TaskError::panicked(panic_message(payload.as_ref()))),
        };

        let outcome = match &result {
            Ok(_) => TaskOutcome::Executed,
            Err(err) => {
                error!("Task failed on host thread: {}", err);
                TaskOutcome::Failed
            }
        };

        // The receiver may have gone away while the task ran; the result is
        // simply discarded then.
        let _ = sender.send(result);
        outcome
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("task panicked")
    }
}
