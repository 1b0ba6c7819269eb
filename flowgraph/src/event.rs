//! Lifecycle events emitted while a run executes, and the sink they go to.
//!
//! For a single run events arrive strictly in visitation order:
//! `node_start(i) → node_end(i) | node_error(i) → node_start(i+1) → …` ending
//! with exactly one terminal event. Across runs there is no ordering.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::run::StateMap;

/// One lifecycle event. Serializes with an `"event"` tag matching the wire
/// names observers see on the stream.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// Before invoking a node's function; `state` is the pre-invocation snapshot.
    NodeStart { node: String, state: StateMap },
    /// After a successful merge; `state` is the post-merge snapshot.
    NodeEnd { node: String, state: StateMap },
    /// Any structural or runtime failure for one node visit.
    NodeError { node: String, message: String },
    /// The run could not start (e.g. unknown graph). Terminal.
    WorkflowError { error: String },
    /// The walk ended; carries the final state. Terminal.
    WorkflowComplete { run_id: String, final_state: StateMap },
}

impl RunEvent {
    /// True for the event that closes a run's stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunEvent::WorkflowError { .. } | RunEvent::WorkflowComplete { .. }
        )
    }

    /// Node name for node-scoped events, `None` for workflow-level ones.
    pub fn node(&self) -> Option<&str> {
        match self {
            RunEvent::NodeStart { node, .. }
            | RunEvent::NodeEnd { node, .. }
            | RunEvent::NodeError { node, .. } => Some(node),
            _ => None,
        }
    }
}

/// Where the engine pushes events. Decoupled from how events reach an
/// observer: a sink may queue, forward, or drop.
///
/// `publish` must be safe to call with no observer attached and must not
/// block the engine indefinitely; it never reports failure back.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, run_id: &str, event: RunEvent);
}

/// Sink that drops every event. Useful for fire-and-forget runs and tests.
pub struct NullSink;

#[async_trait]
impl EventSink for NullSink {
    async fn publish(&self, _run_id: &str, _event: RunEvent) {}
}
