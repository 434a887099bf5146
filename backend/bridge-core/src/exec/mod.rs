//! Code execution on the host thread.
//!
//! The actual interpreter sits behind [`CodeExecutor`]; this module only
//! decides where it runs (always inside a scheduler task) and where its
//! output goes (a buffer, or a line-by-line stream of chunks).

mod script;
mod sink;

pub use script::{DENIED_PRIMITIVES, ScriptExecutor};
pub use sink::{BufferSink, OutputSink, StreamSink};

use crate::error::{ExecError, TaskError};
use crate::task_queue::TaskQueue;

use std::sync::Arc;

use log::debug;
use tokio::sync::mpsc::UnboundedSender;

/// Runs client-supplied source against host state.
///
/// Implementations define the sandbox: what the code can see and which
/// primitives it is denied. Everything written to `out` is the code's
/// standard output.
pub trait CodeExecutor<H>: Send + Sync {
    fn execute(
        &self,
        host: &mut H,
        source: &str,
        out: &mut dyn OutputSink,
    ) -> Result<(), ExecError>;
}

/// `(output, error)` pair reported for one execution. Exactly one is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutcome {
    pub output: Option<String>,
    pub error: Option<String>,
}

impl ExecOutcome {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: Some(output.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            output: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

fn failure_from(error: TaskError) -> ExecOutcome {
    match error {
        TaskError::Failed { message, .. } => ExecOutcome::failure(message),
        TaskError::Panicked { message, .. } => ExecOutcome::failure(format!("Panic: {message}")),
        other => ExecOutcome::failure(format!("HostUnavailable: {}", other.reason())),
    }
}

pub struct ExecutionEngine<H> {
    executor: Arc<dyn CodeExecutor<H>>,
}

impl<H: 'static> ExecutionEngine<H> {
    pub fn new(executor: impl CodeExecutor<H> + 'static) -> Self {
        Self {
            executor: Arc::new(executor),
        }
    }

    /// Executes `source` on the host thread and returns everything it
    /// printed.
    ///
    /// On failure `output` is `None` and `error` reads `"Kind: message"`.
    pub async fn execute(&self, source: String, queue: &TaskQueue<H>) -> ExecOutcome {
        let executor = Arc::clone(&self.executor);
        debug!("Submitting code execution ({} bytes)", source.len());

        let handle = queue.submit(move |host: &mut H| {
            let mut sink = BufferSink::default();
            executor.execute(host, &source, &mut sink)?;
            Ok(sink.into_output())
        });

        match handle.await {
            Ok(output) => ExecOutcome::success(output),
            Err(error) => failure_from(error),
        }
    }

    /// Executes `source` on the host thread, pushing each printed line into
    /// `chunks` as it is written.
    ///
    /// The returned outcome is the stream's terminal message: `output` is
    /// empty on success since everything already went out as chunks.
    pub async fn execute_streaming(
        &self,
        source: String,
        chunks: UnboundedSender<String>,
        queue: &TaskQueue<H>,
    ) -> ExecOutcome {
        let executor = Arc::clone(&self.executor);
        debug!("Submitting streaming execution ({} bytes)", source.len());

        let handle = queue.submit(move |host: &mut H| {
            let mut sink = StreamSink::new(chunks);
            executor.execute(host, &source, &mut sink)?;
            Ok(())
        });

        match handle.await {
            Ok(()) => ExecOutcome::success(String::new()),
            Err(error) => failure_from(error),
        }
    }
}
