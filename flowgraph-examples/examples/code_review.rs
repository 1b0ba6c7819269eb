//! Runs the built-in code-review workflow and prints each event.
//!
//! Run: `cargo run -p flowgraph-examples --example code_review`

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use flowgraph::{
    Engine, EventSink, GraphDefinition, GraphStore, NodeDef, NodeRegistry, RunEvent, StateMap,
};

/// Prints every event as one JSON line.
struct StdoutSink;

#[async_trait]
impl EventSink for StdoutSink {
    async fn publish(&self, run_id: &str, event: RunEvent) {
        let line = serde_json::to_string(&event).unwrap_or_default();
        println!("[{}] {}", run_id, line);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = NodeRegistry::new();
    flowgraph::workflows::register_builtin(&mut registry);

    let graph = GraphDefinition::new(
        vec![
            NodeDef::new("extract", "extract_functions"),
            NodeDef::new("complexity", "check_complexity"),
            NodeDef::new("issues", "detect_issues"),
            NodeDef::new("suggest", "suggest_improvements"),
        ],
        HashMap::from([
            ("extract".to_string(), vec!["complexity".to_string()]),
            ("complexity".to_string(), vec!["issues".to_string()]),
            ("issues".to_string(), vec!["suggest".to_string()]),
        ]),
        "extract",
    )?;

    let store = Arc::new(GraphStore::new());
    let graph_id = store.save_graph(graph);

    let mut initial = StateMap::new();
    initial.insert(
        "code".to_string(),
        serde_json::json!("fn parse() {}\nfn render() {}\nfn main() {}"),
    );
    let run = store.create_run(&graph_id, initial)?;

    let engine = Engine::new(Arc::clone(&store), Arc::new(registry), Arc::new(StdoutSink));
    engine.execute(Arc::clone(&run)).await;

    let snapshot = run.read().await;
    println!(
        "final quality_score: {}",
        snapshot.state.get("quality_score").cloned().unwrap_or_default()
    );
    Ok(())
}
