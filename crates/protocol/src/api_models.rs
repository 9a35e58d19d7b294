//! HTTP response envelopes.
//!
//! `POST /generate` answers with a [`GenerateResponse`]:
//!
//! ```json
//! { "success": true, "data": { "content": "# Proposal ...", "run_id": "..." } }
//! { "success": false, "error": "requirements-analysis failed: ..." }
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Envelope returned by `POST /generate` and `GET /api/runs/{id}/result`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct GenerateResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<GenerateData>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Payload of a successful generation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct GenerateData {
    /// The proposal as Markdown.
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub run_id: Option<Uuid>,
}

impl GenerateResponse {
    pub fn ok(run_id: Uuid, content: String) -> Self {
        Self {
            success: true,
            data: Some(GenerateData {
                content,
                run_id: Some(run_id),
            }),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Body of `202 Accepted` from `POST /api/runs`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct SubmitResponse {
    #[ts(type = "string")]
    pub run_id: Uuid,
}

/// Entry of `GET /api/templates`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct TemplateSummary {
    pub name: String,
    pub description: String,
    pub stages: Vec<String>,
}
