//! Execution engine: drives one run's walk over its graph.
//!
//! One iteration per node visit: resolve the node, resolve its function,
//! await it on a copy of the working state, shallow-merge the output, log,
//! emit events, then either stop (threshold, exhaustion, step guard, error)
//! or advance to the first successor. Exactly one terminal event is emitted
//! per run: `workflow_error` when the graph lookup fails before any visit,
//! `workflow_complete` on every other exit path.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::event::{EventSink, RunEvent};
use crate::graph::GraphDefinition;
use crate::logging;
use crate::registry::NodeRegistry;
use crate::run::{RunState, StateMap};
use crate::store::GraphStore;

/// Failure of a single node visit. Caught inside the execution loop,
/// converted into a `node_error` event plus an error log entry, and never
/// re-raised to whoever started the run.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The node name has no definition in the graph's node index.
    #[error("node definition missing")]
    NodeResolution,

    /// The node's function name is not in the registry.
    #[error("function '{0}' not registered")]
    FunctionResolution(String),

    /// The node's function returned an error.
    #[error("{0}")]
    NodeExecution(String),

    /// The node's function returned something other than a JSON object.
    #[error("node output must be a mapping")]
    OutputContract,
}

/// Engine knobs: termination predicate and the per-run step guard.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// State key checked after each merge.
    pub quality_key: String,
    /// The walk stops once `state[quality_key] >= quality_threshold`.
    pub quality_threshold: f64,
    /// Upper bound on node visits per run; re-armed on every `execute`.
    /// Not a cycle detector, only a guard against walks the predicate
    /// never stops.
    pub max_steps: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quality_key: "quality_score".to_string(),
            quality_threshold: 20.0,
            max_steps: 100,
        }
    }
}

/// The scheduler. Owns no run data: it reads graphs through the store and
/// mutates the `RunState` it is handed. Construct one per process or per
/// test; nothing here is global.
pub struct Engine {
    store: Arc<GraphStore>,
    registry: Arc<NodeRegistry>,
    sink: Arc<dyn EventSink>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(
        store: Arc<GraphStore>,
        registry: Arc<NodeRegistry>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self::with_config(store, registry, sink, EngineConfig::default())
    }

    pub fn with_config(
        store: Arc<GraphStore>,
        registry: Arc<NodeRegistry>,
        sink: Arc<dyn EventSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            registry,
            sink,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Executes a run to completion. Within the run everything is strictly
    /// sequential; the only suspension points are node functions and event
    /// publication. The run is finished on every exit path.
    pub async fn execute(&self, run: Arc<RwLock<RunState>>) {
        let (run_id, graph_id) = {
            let r = run.read().await;
            (r.run_id.clone(), r.graph_id.clone())
        };
        logging::log_run_start(&run_id);

        let graph = match self.store.get_graph(&graph_id) {
            Ok(graph) => graph,
            Err(err) => {
                let error = err.to_string();
                self.sink
                    .publish(&run_id, RunEvent::WorkflowError { error: error.clone() })
                    .await;
                run.write().await.finish();
                logging::log_run_error(&run_id, &error);
                return;
            }
        };

        let mut current = graph.start_node().to_string();
        let mut steps = 0usize;

        loop {
            steps += 1;

            let state_before = {
                let mut r = run.write().await;
                r.current_node = Some(current.clone());
                r.state.clone()
            };
            logging::log_node_start(&run_id, &current);
            self.sink
                .publish(
                    &run_id,
                    RunEvent::NodeStart {
                        node: current.clone(),
                        state: state_before.clone(),
                    },
                )
                .await;

            match self.visit(&graph, &current, state_before).await {
                Ok(output) => {
                    let state_after = {
                        let mut r = run.write().await;
                        for (key, value) in output {
                            r.state.insert(key, value);
                        }
                        r.log_success(&current);
                        r.state.clone()
                    };
                    logging::log_node_end(&run_id, &current);
                    self.sink
                        .publish(
                            &run_id,
                            RunEvent::NodeEnd {
                                node: current.clone(),
                                state: state_after.clone(),
                            },
                        )
                        .await;

                    if self.threshold_reached(&state_after) {
                        break;
                    }
                    if steps >= self.config.max_steps {
                        logging::log_step_limit(&run_id, self.config.max_steps);
                        break;
                    }
                    match graph.successors(&current).first() {
                        Some(next) => current = next.clone(),
                        None => break,
                    }
                }
                Err(err) => {
                    let message = err.to_string();
                    self.sink
                        .publish(
                            &run_id,
                            RunEvent::NodeError {
                                node: current.clone(),
                                message: message.clone(),
                            },
                        )
                        .await;
                    run.write().await.log_error(&current, &message);
                    logging::log_node_error(&run_id, &current, &message);
                    break;
                }
            }
        }

        let final_state = {
            let mut r = run.write().await;
            r.finish();
            r.state.clone()
        };
        logging::log_run_complete(&run_id);
        self.sink
            .publish(
                &run_id,
                RunEvent::WorkflowComplete {
                    run_id: run_id.clone(),
                    final_state,
                },
            )
            .await;
    }

    /// One node visit: resolve definition and function, await the function
    /// on a copy of the state, enforce the mapping-output contract.
    async fn visit(
        &self,
        graph: &GraphDefinition,
        node: &str,
        state: StateMap,
    ) -> Result<StateMap, ExecError> {
        let def = graph.node(node).ok_or(ExecError::NodeResolution)?;
        let func = self
            .registry
            .resolve(&def.func)
            .ok_or_else(|| ExecError::FunctionResolution(def.func.clone()))?;
        let output = func
            .call(&state)
            .await
            .map_err(|e| ExecError::NodeExecution(e.to_string()))?;
        match output {
            Value::Object(map) => Ok(map),
            _ => Err(ExecError::OutputContract),
        }
    }

    /// True once the designated numeric state field reaches the threshold.
    fn threshold_reached(&self, state: &StateMap) -> bool {
        state
            .get(&self.config.quality_key)
            .and_then(Value::as_f64)
            .is_some_and(|score| score >= self.config.quality_threshold)
    }
}
