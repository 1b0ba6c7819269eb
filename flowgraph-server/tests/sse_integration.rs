//! Integration test: create graph → start run → drain the SSE stream.
//!
//! **Scenario**: Full flow without a real socket: the router handles
//! `POST /graph/create`, `POST /graph/run`, then `GET /events/:run_id`
//! yields the run's events in order, ending with `workflow_complete`, and
//! the final snapshot reports the run finished.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use flowgraph::{Engine, EventSink, GraphStore, NodeRegistry};
use flowgraph_server::{app, AppState, EventHub};

fn build_app() -> axum::Router {
    let store = Arc::new(GraphStore::new());
    let hub = Arc::new(EventHub::new());
    let mut registry = NodeRegistry::new();
    flowgraph::workflows::register_builtin(&mut registry);
    let engine = Arc::new(Engine::new(
        Arc::clone(&store),
        Arc::new(registry),
        Arc::clone(&hub) as Arc<dyn EventSink>,
    ));
    app(Arc::new(AppState { store, engine, hub }))
}

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(res: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(res.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn create_run_drain_events_flow() {
    let app = build_app();

    let res = app
        .clone()
        .oneshot(json_post(
            "/graph/create",
            serde_json::json!({
                "nodes": [
                    {"name": "extract", "func": "extract_functions"},
                    {"name": "complexity", "func": "check_complexity"},
                    {"name": "issues", "func": "detect_issues"},
                    {"name": "suggest", "func": "suggest_improvements"}
                ],
                "edges": {
                    "extract": ["complexity"],
                    "complexity": ["issues"],
                    "issues": ["suggest"]
                },
                "start_node": "extract"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let graph_id = json_body(res).await["graph_id"].as_str().unwrap().to_string();

    let res = app
        .clone()
        .oneshot(json_post(
            "/graph/run",
            serde_json::json!({
                "graph_id": graph_id,
                "state": {"code": "fn a() {}\nfn b() {}"}
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let run_id = json_body(res).await["run_id"].as_str().unwrap().to_string();

    // The stream stays open until the terminal event drops the sender, so
    // reading the body to the end waits for the run to finish.
    let res = app
        .clone()
        .oneshot(
            Request::get(format!("/events/{}", run_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "text/event-stream"
    );

    let bytes = axum::body::to_bytes(res.into_body(), 1024 * 1024).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let events: Vec<serde_json::Value> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect();

    let names: Vec<&str> = events.iter().map(|e| e["event"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        [
            "node_start",
            "node_end",
            "node_start",
            "node_end",
            "node_start",
            "node_end",
            "node_start",
            "node_end",
            "workflow_complete"
        ]
    );
    let last = events.last().unwrap();
    assert_eq!(last["run_id"], run_id.as_str());
    assert_eq!(last["final_state"]["quality_score"], 90);

    // A second subscriber gets nothing: the stream was consumed.
    let res = app
        .clone()
        .oneshot(
            Request::get(format!("/events/{}", run_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .oneshot(
            Request::get(format!("/graph/state/{}", run_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let snapshot = json_body(res).await;
    assert_eq!(snapshot["finished"], true);
    assert!(snapshot["current_node"].is_null());
    assert_eq!(snapshot["state"]["functions"], 2);
    assert_eq!(snapshot["logs"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn failing_function_streams_node_error_then_complete() {
    let app = build_app();

    // "missing_func" is not registered, so the first visit fails.
    let res = app
        .clone()
        .oneshot(json_post(
            "/graph/create",
            serde_json::json!({
                "nodes": [{"name": "a", "func": "missing_func"}],
                "start_node": "a"
            }),
        ))
        .await
        .unwrap();
    let graph_id = json_body(res).await["graph_id"].as_str().unwrap().to_string();

    let res = app
        .clone()
        .oneshot(json_post(
            "/graph/run",
            serde_json::json!({ "graph_id": graph_id }),
        ))
        .await
        .unwrap();
    let run_id = json_body(res).await["run_id"].as_str().unwrap().to_string();

    let res = app
        .clone()
        .oneshot(
            Request::get(format!("/events/{}", run_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(res.into_body(), 1024 * 1024).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let names: Vec<String> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| {
            serde_json::from_str::<serde_json::Value>(data).unwrap()["event"]
                .as_str()
                .unwrap()
                .to_string()
        })
        .collect();
    assert_eq!(names, ["node_start", "node_error", "workflow_complete"]);

    let res = app
        .oneshot(
            Request::get(format!("/graph/state/{}", run_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let snapshot = json_body(res).await;
    assert_eq!(snapshot["finished"], true);
    assert_eq!(snapshot["logs"][0]["status"], "error");
}
