//! Error types for talking to a proposal server.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while submitting briefs or polling progress.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The request never produced a response (connection refused, reset,
    /// timed out).
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-2xx status.
    #[error("{url} answered HTTP {status}{}", detail(.message))]
    Http {
        url: String,
        status: u16,
        message: Option<String>,
    },

    /// The body did not have the expected shape.
    #[error("Malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },

    /// The server accepted the request but reported a failure in the body.
    #[error("{0}")]
    Rejected(String),

    /// The server no longer knows the run being tracked.
    #[error("Run {0} is no longer known to the server")]
    RunNotFound(Uuid),
}

fn detail(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {message}"),
        None => String::new(),
    }
}
