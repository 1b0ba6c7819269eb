//! Graph validation error.
//!
//! Returned by `GraphDefinition::new` when node names collide or edges
//! reference names that are not registered as nodes.

use thiserror::Error;

/// Error when validating a graph definition (e.g. edge references unknown node).
///
/// Returned by `GraphDefinition::new()`. Validation ensures node names are
/// unique, every edge endpoint names a known node, and the start node exists.
/// A graph id is never issued for a definition that fails here.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Two nodes share the same name.
    #[error("duplicate node name '{0}'")]
    DuplicateNode(String),

    /// An edge source is not registered as a node.
    #[error("edge source '{0}' not found in nodes")]
    UnknownEdgeSource(String),

    /// An edge target is not registered as a node.
    #[error("edge target '{0}' not found in nodes")]
    UnknownEdgeTarget(String),

    /// The designated start node is not registered as a node.
    #[error("start_node '{0}' not found in nodes")]
    UnknownStartNode(String),
}
