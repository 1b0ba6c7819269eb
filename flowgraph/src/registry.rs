//! Node registry: function name → executable unit of work.
//!
//! Populated during startup, then frozen behind `Arc` and shared read-only by
//! every run. The engine resolves a `NodeDef::func` name here on each visit.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::NodeError;
use crate::run::StateMap;

/// Unit of work bound to a function name: working state in, partial state out.
///
/// The returned value must be a JSON object whose keys are shallow-merged
/// over the run's state; the engine enforces that contract after awaiting.
/// Synchronous and suspending implementations are indistinguishable to the
/// engine: it always awaits completion before merging.
#[async_trait]
pub trait NodeFunc: Send + Sync {
    async fn call(&self, state: &StateMap) -> Result<Value, NodeError>;
}

/// Adapter so plain async functions and closures register without a manual
/// `NodeFunc` impl.
struct FnNodeFunc<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> NodeFunc for FnNodeFunc<F>
where
    F: Fn(StateMap) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, NodeError>> + Send,
{
    async fn call(&self, state: &StateMap) -> Result<Value, NodeError> {
        (self.f)(state.clone()).await
    }
}

/// Name → function table. Writes happen before any run starts; afterwards the
/// registry is shared as `Arc<NodeRegistry>` and only read.
#[derive(Default)]
pub struct NodeRegistry {
    funcs: HashMap<String, Arc<dyn NodeFunc>>,
}

impl NodeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a name to a function; re-registering replaces the prior binding
    /// (last write wins). Returns `&mut Self` for method chaining.
    pub fn register(&mut self, name: impl Into<String>, func: Arc<dyn NodeFunc>) -> &mut Self {
        self.funcs.insert(name.into(), func);
        self
    }

    /// Binds a name to an async function or closure `StateMap -> partial state`.
    pub fn register_fn<F, Fut>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(StateMap) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, NodeError>> + Send + 'static,
    {
        self.register(name, Arc::new(FnNodeFunc { f }))
    }

    /// Resolves a name to its function, or `None` when unregistered.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn NodeFunc>> {
        self.funcs.get(name).cloned()
    }
}
