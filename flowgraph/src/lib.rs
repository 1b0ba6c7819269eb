//! # flowgraph
//!
//! A small workflow execution engine: directed graphs of named processing
//! steps walked sequentially against a shared JSON state, with lifecycle
//! events streamed to an observer in real time.
//!
//! ## Design Principles
//!
//! - **State-in, partial-state-out**: every node function receives the
//!   current working state and returns a partial mapping that the engine
//!   shallow-merges back (result keys overwrite, untouched keys survive).
//! - **One walk, one task**: a run executes as a single sequential task;
//!   each visit completes (including any suspension inside the function)
//!   before the next begins. No fan-out across successor edges.
//! - **Fail fast at the edges**: graphs are validated at construction, never
//!   at execution time; execution-time failures become `node_error` events
//!   and end the walk without reaching the caller that started the run.
//! - **Explicit wiring**: the registry, store, and sink are constructed
//!   objects passed to the engine, so isolated engines coexist in one
//!   process (and in one test binary).
//!
//! ## Main Modules
//!
//! - [`graph`]: `GraphDefinition`, `NodeDef` — validated, immutable graphs.
//! - [`registry`]: `NodeRegistry`, `NodeFunc` — name → unit of work.
//! - [`run`]: `RunState`, `LogEntry` — the mutable per-execution record.
//! - [`event`]: `RunEvent`, `EventSink` — lifecycle events and where they go.
//! - [`engine`]: `Engine`, `EngineConfig` — the scheduling loop.
//! - [`store`]: `GraphStore` — in-memory keyed graphs and runs.
//! - [`workflows`]: built-in demo node functions.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use flowgraph::{Engine, GraphDefinition, GraphStore, NodeDef, NodeRegistry, NullSink};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = NodeRegistry::new();
//! registry.register_fn("greet", |_state| async move {
//!     Ok(json!({ "greeting": "hello" }))
//! });
//!
//! let graph = GraphDefinition::new(
//!     vec![NodeDef::new("start", "greet")],
//!     Default::default(),
//!     "start",
//! )?;
//!
//! let store = Arc::new(GraphStore::new());
//! let graph_id = store.save_graph(graph);
//! let run = store.create_run(&graph_id, Default::default())?;
//!
//! let engine = Engine::new(Arc::clone(&store), Arc::new(registry), Arc::new(NullSink));
//! engine.execute(Arc::clone(&run)).await;
//!
//! assert_eq!(run.read().await.state["greeting"], "hello");
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod event;
pub mod graph;
pub mod logging;
pub mod registry;
pub mod run;
pub mod store;
pub mod workflows;

pub use engine::{Engine, EngineConfig, ExecError};
pub use error::NodeError;
pub use event::{EventSink, NullSink, RunEvent};
pub use graph::{GraphDefinition, NodeDef, ValidationError};
pub use registry::{NodeFunc, NodeRegistry};
pub use run::{LogEntry, LogStatus, RunState, StateMap};
pub use store::{GraphStore, StoreError};
