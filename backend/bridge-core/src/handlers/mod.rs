//! Named operations a client can invoke with `{"handler": ..., "params": ...}`.
//!
//! Each handler is a statically typed [`Handler`] registered under its
//! name. The registry never calls a handler directly: the body is always
//! submitted to the [`TaskQueue`] and runs on the host thread, while the
//! connection awaits the result without blocking other connections.

mod node_groups;
mod objects;
pub mod params;

pub use node_groups::{GetNodeGroupInfo, ListNodeGroups};
pub use objects::{GetObjectInfo, ListObjects};

use crate::error::{DispatchError, HandlerError, TaskError};
use crate::scene::SceneHost;
use crate::task_queue::TaskQueue;
use crate::value::HostValue;

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

/// Request parameters as received on the wire.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// What a handler hands back: human-readable output plus structured data.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOutcome {
    pub output: String,
    pub error: Option<String>,
    pub result: Option<HostValue>,
}

impl HandlerOutcome {
    pub fn success(output: impl Into<String>, result: HostValue) -> Self {
        Self {
            output: output.into(),
            error: None,
            result: Some(result),
        }
    }
}

/// A named operation over host state of type `H`.
pub trait Handler<H>: Send + Sync {
    fn name(&self) -> &'static str;

    /// Runs on the host thread, inside a scheduler task.
    fn call(&self, host: &mut H, params: &Params) -> Result<HandlerOutcome, HandlerError>;
}

pub struct HandlerRegistry<H> {
    handlers: HashMap<&'static str, Arc<dyn Handler<H>>>,
}

impl<H: 'static> HandlerRegistry<H> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers `handler` under its name. A later registration with the
    /// same name replaces the earlier one.
    pub fn register(&mut self, handler: impl Handler<H> + 'static) -> &mut Self {
        let name = handler.name();
        if self.handlers.insert(name, Arc::new(handler)).is_some() {
            warn!("Handler '{}' re-registered; previous handler replaced", name);
        }
        self
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Looks up `name` and runs it on the host thread via `queue`.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::UnknownHandler`] if nothing is registered under
    ///   `name`; nothing is submitted in that case
    /// - [`DispatchError::HandlerFailed`] if the handler returned an error or
    ///   panicked
    /// - [`DispatchError::HostUnavailable`] if the task was discarded before
    ///   it ran
    pub async fn invoke(
        &self,
        name: &str,
        params: Params,
        queue: &TaskQueue<H>,
    ) -> Result<HandlerOutcome, DispatchError> {
        let handler = self
            .handlers
            .get(name)
            .cloned()
            .ok_or_else(|| DispatchError::unknown_handler(name))?;

        debug!("Submitting handler '{}'", name);
        let handle = queue.submit(move |host: &mut H| {
            handler.call(host, &params).map_err(TaskError::from)
        });

        handle.await.map_err(|e| match e {
            TaskError::Failed { .. } | TaskError::Panicked { .. } => {
                DispatchError::handler_failed(name, e.reason())
            }
            TaskError::Cancelled { .. } | TaskError::Dropped { .. } => {
                let reason = format!("Handler '{name}' did not run: {}", e.reason());
                DispatchError::host_unavailable(reason)
            }
        })
    }
}

impl<H: SceneHost + 'static> HandlerRegistry<H> {
    /// Registry with the built-in scene introspection handlers.
    pub fn with_scene_handlers() -> Self {
        let mut registry = Self::new();
        registry
            .register(ListObjects)
            .register(GetObjectInfo)
            .register(ListNodeGroups)
            .register(GetNodeGroupInfo);
        registry
    }
}

impl<H: 'static> Default for HandlerRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}
