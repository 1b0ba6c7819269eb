//! Per-execution run record: working state, log, position, completion.
//!
//! A `RunState` is created when a run starts and mutated exclusively by the
//! task executing that run; once `finished` is true it is effectively
//! immutable and only read through snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The working payload: string keys to arbitrary JSON values.
pub type StateMap = serde_json::Map<String, Value>;

/// Outcome of one node visit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Success,
    Error,
}

/// One entry per node visit, append-only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub node: String,
    pub status: LogStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Mutable per-execution record.
///
/// Lifecycle: pending (no visits yet) → running (`current_node` set) →
/// finished (`finished` true, `finished_at` set, `current_node` cleared).
/// The log distinguishes a failed walk from a completed one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunState {
    pub run_id: String,
    pub graph_id: String,
    pub state: StateMap,
    pub logs: Vec<LogEntry>,
    pub current_node: Option<String>,
    pub finished: bool,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunState {
    pub fn new(
        run_id: impl Into<String>,
        graph_id: impl Into<String>,
        initial_state: StateMap,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            graph_id: graph_id.into(),
            state: initial_state,
            logs: Vec::new(),
            current_node: None,
            finished: false,
            finished_at: None,
        }
    }

    /// Appends a success entry for a completed node visit.
    pub fn log_success(&mut self, node: &str) {
        self.logs.push(LogEntry {
            timestamp: Utc::now(),
            node: node.to_string(),
            status: LogStatus::Success,
            message: None,
        });
    }

    /// Appends an error entry for a failed node visit.
    pub fn log_error(&mut self, node: &str, message: &str) {
        self.logs.push(LogEntry {
            timestamp: Utc::now(),
            node: node.to_string(),
            status: LogStatus::Error,
            message: Some(message.to_string()),
        });
    }

    /// Marks the run terminal: clears the position, stamps completion time.
    pub fn finish(&mut self) {
        self.current_node = None;
        self.finished = true;
        self.finished_at = Some(Utc::now());
    }
}
