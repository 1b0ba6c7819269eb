//! HTTP surface for the flowgraph engine: control API plus SSE event streams.
//!
//! The router lives here (not in the binary) so integration tests can drive
//! it with `tower::ServiceExt::oneshot`; `main.rs` only wires config,
//! tracing, and the listener.

pub mod error;
pub mod hub;
pub mod routes;

pub use error::ServerError;
pub use hub::EventHub;
pub use routes::{app, AppState, RunRequest};
