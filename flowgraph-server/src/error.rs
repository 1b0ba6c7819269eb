//! Control-API error responses.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use thiserror::Error;

use flowgraph::{StoreError, ValidationError};

/// Error returned by the control routes. Maps to the HTTP layer with a
/// `{"error":{"message":…}}` body.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Malformed graph at creation time; no graph id is issued.
    #[error("bad request: {0}")]
    Validation(#[from] ValidationError),

    /// Unknown graph or run id.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        ServerError::NotFound(err.to_string())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        let msg = self.to_string();
        (status, Json(serde_json::json!({ "error": { "message": msg } }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Validation maps to 400, not-found to 404.
    #[test]
    fn status_mapping() {
        let res = ServerError::Validation(ValidationError::UnknownStartNode("x".into()))
            .into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = ServerError::from(StoreError::RunNotFound("r1".into())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
