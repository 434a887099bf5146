use crate::exec::ExecutionEngine;
use crate::handlers::HandlerRegistry;
use crate::task_queue::TaskQueue;

use std::sync::Arc;

/// Everything a connection dispatches into, shared by all connections.
pub struct BridgeServices<H> {
    pub queue: Arc<TaskQueue<H>>,
    pub handlers: HandlerRegistry<H>,
    pub engine: ExecutionEngine<H>,
}

impl<H: 'static> BridgeServices<H> {
    pub fn new(
        queue: Arc<TaskQueue<H>>,
        handlers: HandlerRegistry<H>,
        engine: ExecutionEngine<H>,
    ) -> Self {
        Self {
            queue,
            handlers,
            engine,
        }
    }
}
