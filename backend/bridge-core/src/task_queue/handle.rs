use crate::error::TaskError;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use tokio::sync::oneshot;

/// Completion handle for a submitted task.
///
/// Resolves exactly once: with the task's value, its error, or
/// [`TaskError::Cancelled`] / [`TaskError::Dropped`] if it never ran.
/// Dropping the handle without awaiting it cancels the task.
#[must_use = "dropping a TaskHandle cancels the task"]
pub struct TaskHandle<T> {
    receiver: oneshot::Receiver<Result<T, TaskError>>,
    cancelled: Arc<AtomicBool>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(
        receiver: oneshot::Receiver<Result<T, TaskError>>,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        Self {
            receiver,
            cancelled,
        }
    }

    /// Marks the task cancelled. A task still queued is skipped by the
    /// drain; one already running on the host thread completes normally.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, TaskError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) if self.is_cancelled() => {
                Poll::Ready(Err(TaskError::cancelled()))
            }
            Poll::Ready(Err(_)) => Poll::Ready(Err(TaskError::dropped())),
            Poll::Pending => Poll::Pending,
        }
    }
}
