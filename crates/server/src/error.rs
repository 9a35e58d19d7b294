//! Error types for the HTTP surface.
//!
//! Every failure a handler reports is rendered as a
//! `{ "success": false, "error": "..." }` envelope with a matching status
//! code, so browser and terminal clients parse one shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pg_core::state::RegistryError;
use pg_protocol::api_models::GenerateResponse;
use std::net::SocketAddr;
use thiserror::Error;
use uuid::Uuid;

/// Failures reported to HTTP callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request body was not a usable brief.
    #[error("{0}")]
    BadRequest(String),

    #[error("Run {0} not found")]
    NotFound(Uuid),

    /// The run exists but is in the wrong state for the request.
    #[error("{0}")]
    Conflict(String),

    /// A stage failed or the run was cancelled.
    #[error("{0}")]
    RunFailed(String),

    #[error("Generation did not finish within {secs}s; poll /api/progress?run_id={run_id}")]
    Timeout { run_id: Uuid, secs: u64 },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RunFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidBrief(_) | RegistryError::Plan(_) => {
                ApiError::BadRequest(err.to_string())
            }
            RegistryError::NotFound(run_id) => ApiError::NotFound(run_id),
            RegistryError::AlreadyFinished(_) => ApiError::Conflict(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(GenerateResponse::err(self.to_string()))).into_response()
    }
}

/// Failures starting or running the server itself.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server on {addr} stopped: {source}")]
    Serve {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Engine(#[from] pg_core::engine::EngineError),
}
