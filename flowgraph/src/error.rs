//! Node function error type.
//!
//! Returned by `NodeFunc::call` and by every function registered through
//! `NodeRegistry::register_fn`.

use thiserror::Error;

/// Node function execution error.
///
/// Returned when a node's work fails (e.g. bad input in the working state,
/// an external call failed). The engine converts it into a `node_error`
/// event and an error log entry; it is never re-raised to the run's starter.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Execution failed with a message.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display format contains "execution failed" and the message.
    #[test]
    fn node_error_display() {
        let err = NodeError::ExecutionFailed("bad input".to_string());
        let s = err.to_string();
        assert!(s.contains("execution failed"), "{}", s);
        assert!(s.contains("bad input"), "{}", s);
    }
}
