//! Graph definition: named nodes plus an edge map from node name to successors.
//!
//! Build with `GraphDefinition::new(nodes, edges, start_node)`; all invariants
//! are checked there, so a constructed (or deserialized) graph is always valid.
//! The definition is immutable and may be shared by concurrent runs.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::graph::validation_error::ValidationError;

/// One node: a unique name bound to a registry function name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeDef {
    pub name: String,
    /// Key into the `NodeRegistry`; resolved at execution time.
    pub func: String,
}

impl NodeDef {
    pub fn new(name: impl Into<String>, func: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            func: func.into(),
        }
    }
}

/// Validated, immutable workflow graph: nodes, successor edges, start node.
///
/// Construction fails fast with [`ValidationError`] instead of deferring
/// broken references to execution time. Deserialization funnels through the
/// same constructor, so API input cannot produce an invalid graph.
///
/// **Interaction**: stored as `Arc<GraphDefinition>` in the `GraphStore` and
/// read (never written) by the `Engine`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawGraphDefinition")]
pub struct GraphDefinition {
    nodes: Vec<NodeDef>,
    /// Node name → ordered successor names. Execution follows the first entry.
    edges: HashMap<String, Vec<String>>,
    start_node: String,
    /// Name → position in `nodes`, built once at construction.
    #[serde(skip)]
    index: HashMap<String, usize>,
}

/// Wire shape of a graph before validation; converted via `TryFrom`.
#[derive(Deserialize)]
struct RawGraphDefinition {
    nodes: Vec<NodeDef>,
    #[serde(default)]
    edges: HashMap<String, Vec<String>>,
    start_node: String,
}

impl TryFrom<RawGraphDefinition> for GraphDefinition {
    type Error = ValidationError;

    fn try_from(raw: RawGraphDefinition) -> Result<Self, Self::Error> {
        GraphDefinition::new(raw.nodes, raw.edges, raw.start_node)
    }
}

impl GraphDefinition {
    /// Validates and builds a graph.
    ///
    /// Rejects duplicate node names, edge sources/targets that are not nodes,
    /// and a start node that is not a node. On success the graph is immutable
    /// and ready to execute.
    pub fn new(
        nodes: Vec<NodeDef>,
        edges: HashMap<String, Vec<String>>,
        start_node: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let start_node = start_node.into();

        let mut index = HashMap::with_capacity(nodes.len());
        for (pos, node) in nodes.iter().enumerate() {
            if index.insert(node.name.clone(), pos).is_some() {
                return Err(ValidationError::DuplicateNode(node.name.clone()));
            }
        }
        let names: HashSet<&str> = index.keys().map(String::as_str).collect();

        for (src, targets) in &edges {
            if !names.contains(src.as_str()) {
                return Err(ValidationError::UnknownEdgeSource(src.clone()));
            }
            for target in targets {
                if !names.contains(target.as_str()) {
                    return Err(ValidationError::UnknownEdgeTarget(target.clone()));
                }
            }
        }

        if !names.contains(start_node.as_str()) {
            return Err(ValidationError::UnknownStartNode(start_node));
        }

        Ok(Self {
            nodes,
            edges,
            start_node,
            index,
        })
    }

    /// Looks up a node definition by name.
    pub fn node(&self, name: &str) -> Option<&NodeDef> {
        self.index.get(name).map(|&pos| &self.nodes[pos])
    }

    /// Ordered successors of a node; empty when the node has no outgoing edge.
    pub fn successors(&self, name: &str) -> &[String] {
        self.edges.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn start_node(&self) -> &str {
        &self.start_node
    }

    pub fn nodes(&self) -> &[NodeDef] {
        &self.nodes
    }
}
