//! Workflow engine server: control API plus SSE event streaming.
//!
//! Configure via env: LISTEN, QUALITY_THRESHOLD, MAX_STEPS, LOG_FILE,
//! RUST_LOG. Load .env with dotenv.

use std::sync::Arc;

use axum::http::Request;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span};

use flowgraph::{Engine, EngineConfig, EventSink, GraphStore, NodeRegistry};
use flowgraph_server::{app, AppState, EventHub};

/// Load .env from current directory; if not found, try parent (workspace root
/// when run from crate dir).
fn load_dotenv() {
    if dotenv::dotenv().is_ok() {
        return;
    }
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(parent) = cwd.parent() {
            let env_path = parent.join(".env");
            if env_path.is_file() {
                let _ = dotenv::from_path(env_path);
            }
        }
    }
}

/// Initializes tracing: always to stdout; if env `LOG_FILE` is set, also to
/// that file (append, plain text).
fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::Layer;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,flowgraph_server=debug"));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_filter(filter.clone());

    let registry = tracing_subscriber::registry().with(stdout_layer);

    if let Ok(path) = std::env::var("LOG_FILE") {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_filter(filter);
        registry.with(file_layer).init();
        tracing::info!(path = %path, "logging to file");
    } else {
        registry.init();
    }
    Ok(())
}

/// Engine knobs from env; unset or unparsable values keep the defaults.
fn engine_config_from_env() -> EngineConfig {
    let mut config = EngineConfig::default();
    if let Some(threshold) = std::env::var("QUALITY_THRESHOLD")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        config.quality_threshold = threshold;
    }
    if let Some(max_steps) = std::env::var("MAX_STEPS")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        config.max_steps = max_steps;
    }
    config
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    load_dotenv();
    init_tracing()?;

    let config = engine_config_from_env();
    info!(
        quality_key = %config.quality_key,
        quality_threshold = config.quality_threshold,
        max_steps = config.max_steps,
        "engine config loaded"
    );

    let mut registry = NodeRegistry::new();
    flowgraph::workflows::register_builtin(&mut registry);

    let store = Arc::new(GraphStore::new());
    let hub = Arc::new(EventHub::new());
    let engine = Arc::new(Engine::with_config(
        Arc::clone(&store),
        Arc::new(registry),
        Arc::clone(&hub) as Arc<dyn EventSink>,
        config,
    ));

    let state = Arc::new(AppState { store, engine, hub });
    let router = app(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<axum::body::Body>| {
                info_span!("request", method = %req.method(), uri = %req.uri())
            }),
        )
        .layer(CorsLayer::permissive());

    let listen = std::env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    info!("listening on http://{}", listen);
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
