//! Logging for run execution.
//!
//! Uses the `tracing` crate when the `tracing` feature is enabled, otherwise
//! falls back to stderr so the engine stays observable in minimal builds.

/// Log the start of a run.
pub fn log_run_start(run_id: &str) {
    #[cfg(feature = "tracing")]
    tracing::info!(run_id = run_id, "run started");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[INFO] run started: {}", run_id);
}

/// Log a node visit beginning.
pub fn log_node_start(run_id: &str, node: &str) {
    #[cfg(feature = "tracing")]
    tracing::debug!(run_id = run_id, node = node, "visiting node");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[DEBUG] run {}: visiting node {}", run_id, node);
}

/// Log a successful node visit.
pub fn log_node_end(run_id: &str, node: &str) {
    #[cfg(feature = "tracing")]
    tracing::debug!(run_id = run_id, node = node, "node finished");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[DEBUG] run {}: node finished {}", run_id, node);
}

/// Log a failed node visit.
pub fn log_node_error(run_id: &str, node: &str, message: &str) {
    #[cfg(feature = "tracing")]
    tracing::error!(run_id = run_id, node = node, message = message, "node failed");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[ERROR] run {}: node {} failed: {}", run_id, node, message);
}

/// Log the step guard stopping a run.
pub fn log_step_limit(run_id: &str, max_steps: usize) {
    #[cfg(feature = "tracing")]
    tracing::warn!(run_id = run_id, max_steps = max_steps, "step limit reached, stopping walk");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[WARN] run {}: step limit {} reached, stopping walk", run_id, max_steps);
}

/// Log run completion.
pub fn log_run_complete(run_id: &str) {
    #[cfg(feature = "tracing")]
    tracing::info!(run_id = run_id, "run complete");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[INFO] run complete: {}", run_id);
}

/// Log a run that could not start.
pub fn log_run_error(run_id: &str, error: &str) {
    #[cfg(feature = "tracing")]
    tracing::error!(run_id = run_id, error = error, "run failed to start");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[ERROR] run {} failed to start: {}", run_id, error);
}
