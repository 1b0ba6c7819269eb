//! Control API and SSE event-stream routes.
//!
//! `POST /graph/create` registers a graph, `POST /graph/run` starts a run in
//! the background and returns its id immediately, `GET /graph/state/:run_id`
//! serves polling-style snapshots, and `GET /events/:run_id` streams the
//! run's lifecycle events until the terminal one.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};

use flowgraph::{Engine, GraphDefinition, GraphStore, NodeDef, StateMap};

use crate::error::ServerError;
use crate::hub::EventHub;

/// Shared state for all routes.
pub struct AppState {
    pub store: Arc<GraphStore>,
    pub engine: Arc<Engine>,
    pub hub: Arc<EventHub>,
}

/// Builds the bare router; the binary layers tracing and CORS on top.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/graph/create", post(create_graph))
        .route("/graph/run", post(start_run))
        .route("/graph/state/:run_id", get(run_state))
        .route("/events/:run_id", get(run_events))
        .with_state(state)
}

/// Graph document as posted by clients; validated into a `GraphDefinition`
/// in the handler so rejections use the API error shape.
#[derive(Deserialize)]
pub struct CreateGraphRequest {
    nodes: Vec<NodeDef>,
    #[serde(default)]
    edges: HashMap<String, Vec<String>>,
    start_node: String,
}

#[derive(Deserialize)]
pub struct RunRequest {
    pub graph_id: String,
    #[serde(default)]
    pub state: StateMap,
}

/// Registers a graph. Returns its id, or 400 when validation fails (no id
/// is issued for an invalid graph).
async fn create_graph(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateGraphRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let graph = GraphDefinition::new(req.nodes, req.edges, req.start_node)?;
    let graph_id = state.store.save_graph(graph);
    Ok((StatusCode::CREATED, Json(json!({ "graph_id": graph_id }))))
}

/// Starts a run in the background and returns its id immediately. Events
/// stream over `GET /events/:run_id`; execution-time failures never surface
/// here.
async fn start_run(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RunRequest>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let run = state.store.create_run(&req.graph_id, req.state)?;
    let run_id = run.read().await.run_id.clone();

    // Open the event queue before the engine task can emit anything.
    state.hub.open(&run_id);
    let engine = Arc::clone(&state.engine);
    tokio::spawn(async move {
        engine.execute(run).await;
    });

    Ok(Json(json!({ "run_id": run_id })))
}

/// Serves the current run record (polling style).
async fn run_state(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let snapshot = state.store.run_snapshot(&run_id).await?;
    Ok(Json(snapshot))
}

/// Streams the run's events as SSE until the terminal event closes the
/// queue. One subscriber per run; a second request gets 404.
async fn run_events(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let rx = state
        .hub
        .subscribe(&run_id)
        .ok_or_else(|| ServerError::NotFound(format!("no event stream for run '{}'", run_id)))?;

    let stream = ReceiverStream::new(rx).map(|event| {
        let data = serde_json::to_string(&event).unwrap_or_default();
        Ok::<_, std::io::Error>(Bytes::from(format!("data: {}\n\n", data)))
    });

    let mut res = StatusCode::OK.into_response();
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    res.headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    *res.body_mut() = Body::from_stream(stream);
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use flowgraph::{EventSink, NodeRegistry};
    use tower::ServiceExt;

    fn test_app() -> Router {
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

    /// **Scenario**: A valid graph creates with 201 and returns a graph_id.
    #[tokio::test]
    async fn create_graph_returns_201_and_id() {
        let app = test_app();
        let res = app
            .oneshot(json_post(
                "/graph/create",
                serde_json::json!({
                    "nodes": [{"name": "a", "func": "extract_functions"}],
                    "start_node": "a"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(value["graph_id"].is_string());
    }

    /// **Scenario**: A graph with a dangling edge target returns 400 with the
    /// API error shape.
    #[tokio::test]
    async fn create_invalid_graph_returns_400() {
        let app = test_app();
        let res = app
            .oneshot(json_post(
                "/graph/create",
                serde_json::json!({
                    "nodes": [{"name": "a", "func": "f"}],
                    "edges": {"a": ["ghost"]},
                    "start_node": "a"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let message = value["error"]["message"].as_str().unwrap();
        assert!(message.contains("ghost"), "{}", message);
    }

    /// **Scenario**: Starting a run against an unknown graph returns 404 and
    /// issues no run id.
    #[tokio::test]
    async fn start_run_unknown_graph_returns_404() {
        let app = test_app();
        let res = app
            .oneshot(json_post(
                "/graph/run",
                serde_json::json!({ "graph_id": "missing" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    /// **Scenario**: Unknown run ids 404 for both the snapshot and the
    /// event-stream routes.
    #[tokio::test]
    async fn unknown_run_returns_404() {
        let res = test_app()
            .oneshot(Request::get("/graph/state/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = test_app()
            .oneshot(Request::get("/events/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
