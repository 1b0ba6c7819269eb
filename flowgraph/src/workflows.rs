//! Built-in demo node functions.
//!
//! Two small workflows: an ETL chain and a code-review scorer whose
//! `review_pass` / `review_wait` pair is meant to cycle until the engine's
//! quality threshold stops it. Every function returns a partial state that
//! the engine shallow-merges; none of them touch keys they do not own.

use std::time::Duration;

use serde_json::{json, Value};

use crate::error::NodeError;
use crate::registry::NodeRegistry;
use crate::run::StateMap;

/// Registers every built-in function. Call once at startup on the registry
/// handed to the engine.
pub fn register_builtin(registry: &mut NodeRegistry) {
    registry
        .register_fn("extract_rows", extract_rows)
        .register_fn("transform_rows", transform_rows)
        .register_fn("save_rows", save_rows)
        .register_fn("extract_functions", extract_functions)
        .register_fn("check_complexity", check_complexity)
        .register_fn("detect_issues", detect_issues)
        .register_fn("suggest_improvements", suggest_improvements)
        .register_fn("review_pass", review_pass)
        .register_fn("review_wait", review_wait);
}

fn int_field(state: &StateMap, key: &str) -> i64 {
    state.get(key).and_then(Value::as_i64).unwrap_or(0)
}

// --- ETL chain ---

async fn extract_rows(state: StateMap) -> Result<Value, NodeError> {
    Ok(json!({
        "extracted": true,
        "rows_processed": int_field(&state, "rows_processed") + 10,
    }))
}

async fn transform_rows(state: StateMap) -> Result<Value, NodeError> {
    Ok(json!({
        "transformed": true,
        "rows_processed": int_field(&state, "rows_processed") + 90,
    }))
}

/// Suspends briefly to stand in for real I/O before reporting the save.
async fn save_rows(_state: StateMap) -> Result<Value, NodeError> {
    tokio::time::sleep(Duration::from_millis(100)).await;
    Ok(json!({ "saved": true }))
}

// --- Code-review scorer ---

async fn extract_functions(state: StateMap) -> Result<Value, NodeError> {
    let code = state.get("code").and_then(Value::as_str).unwrap_or("");
    let functions = code.matches("fn ").count();
    Ok(json!({ "functions": functions }))
}

async fn check_complexity(state: StateMap) -> Result<Value, NodeError> {
    Ok(json!({ "complexity": int_field(&state, "functions") * 2 }))
}

async fn detect_issues(state: StateMap) -> Result<Value, NodeError> {
    let issues = (int_field(&state, "complexity") / 3).max(1);
    Ok(json!({ "issues": issues }))
}

async fn suggest_improvements(state: StateMap) -> Result<Value, NodeError> {
    let score = (100 - int_field(&state, "issues") * 10).max(0);
    Ok(json!({ "quality_score": score }))
}

/// Incremental scoring step for cyclic review graphs: each pass nudges the
/// score so the threshold eventually ends the walk.
async fn review_pass(state: StateMap) -> Result<Value, NodeError> {
    Ok(json!({
        "quality_score": int_field(&state, "quality_score") + 3,
        "passes": int_field(&state, "passes") + 1,
    }))
}

/// Suspends briefly between review passes; merges nothing.
async fn review_wait(_state: StateMap) -> Result<Value, NodeError> {
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(json!({}))
}
