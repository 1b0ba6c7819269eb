//! Runs the built-in ETL workflow: extract → transform → save.
//!
//! Run: `cargo run -p flowgraph-examples --example etl`

use std::collections::HashMap;
use std::sync::Arc;

use flowgraph::{
    Engine, GraphDefinition, GraphStore, NodeDef, NodeRegistry, NullSink, StateMap,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = NodeRegistry::new();
    flowgraph::workflows::register_builtin(&mut registry);

    let graph = GraphDefinition::new(
        vec![
            NodeDef::new("extract", "extract_rows"),
            NodeDef::new("transform", "transform_rows"),
            NodeDef::new("save", "save_rows"),
        ],
        HashMap::from([
            ("extract".to_string(), vec!["transform".to_string()]),
            ("transform".to_string(), vec!["save".to_string()]),
        ]),
        "extract",
    )?;

    let store = Arc::new(GraphStore::new());
    let graph_id = store.save_graph(graph);
    let run = store.create_run(&graph_id, StateMap::new())?;

    let engine = Engine::new(Arc::clone(&store), Arc::new(registry), Arc::new(NullSink));
    engine.execute(Arc::clone(&run)).await;

    let snapshot = run.read().await;
    println!("rows processed: {}", snapshot.state["rows_processed"]);
    for entry in &snapshot.logs {
        println!("{} {:?}", entry.node, entry.status);
    }
    Ok(())
}
