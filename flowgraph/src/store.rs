//! In-memory graph and run store: uuid-keyed maps, process lifetime only.
//!
//! Graphs are immutable once saved and shared as `Arc<GraphDefinition>`.
//! Runs are handed out as `Arc<RwLock<RunState>>`: the executing task is the
//! single writer while a run is live; observers read cloned snapshots.

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::graph::GraphDefinition;
use crate::run::{RunState, StateMap};

/// Lookup failure for graphs and runs.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("graph '{0}' not found")]
    GraphNotFound(String),
    #[error("run '{0}' not found")]
    RunNotFound(String),
}

/// Keyed maps for graphs and runs. Shared as `Arc<GraphStore>` between the
/// control surface and the engine.
#[derive(Default)]
pub struct GraphStore {
    graphs: DashMap<String, Arc<GraphDefinition>>,
    runs: DashMap<String, Arc<RwLock<RunState>>>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a validated graph under a fresh opaque id.
    pub fn save_graph(&self, graph: GraphDefinition) -> String {
        let graph_id = Uuid::new_v4().to_string();
        self.graphs.insert(graph_id.clone(), Arc::new(graph));
        graph_id
    }

    pub fn get_graph(&self, graph_id: &str) -> Result<Arc<GraphDefinition>, StoreError> {
        self.graphs
            .get(graph_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| StoreError::GraphNotFound(graph_id.to_string()))
    }

    /// Creates a run against an existing graph. Fails before issuing a run id
    /// when the graph is unknown.
    pub fn create_run(
        &self,
        graph_id: &str,
        initial_state: StateMap,
    ) -> Result<Arc<RwLock<RunState>>, StoreError> {
        if !self.graphs.contains_key(graph_id) {
            return Err(StoreError::GraphNotFound(graph_id.to_string()));
        }
        let run_id = Uuid::new_v4().to_string();
        let run = Arc::new(RwLock::new(RunState::new(run_id.clone(), graph_id, initial_state)));
        self.runs.insert(run_id, Arc::clone(&run));
        Ok(run)
    }

    pub fn get_run(&self, run_id: &str) -> Result<Arc<RwLock<RunState>>, StoreError> {
        self.runs
            .get(run_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| StoreError::RunNotFound(run_id.to_string()))
    }

    /// Clones the run record for polling-style observers.
    pub async fn run_snapshot(&self, run_id: &str) -> Result<RunState, StoreError> {
        let run = self.get_run(run_id)?;
        let snapshot = run.read().await.clone();
        Ok(snapshot)
    }
}
