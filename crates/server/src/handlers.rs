//! Request handlers.
//!
//! Handlers stay thin: they translate HTTP into [`RunRegistry`] and
//! [`ProgressReporter`] calls and map outcomes onto status codes.
//!
//! [`RunRegistry`]: pg_core::state::RunRegistry
//! [`ProgressReporter`]: pg_core::state::ProgressReporter

use crate::error::ApiError;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::Json;
use pg_core::state::RunRecord;
use pg_protocol::api_models::{GenerateResponse, SubmitResponse, TemplateSummary};
use pg_protocol::brief_models::ClientBrief;
use pg_protocol::run_models::{ProgressSnapshot, RunStatus};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

const INDEX_HTML: &str = include_str!("../static/index.html");
const POLL_INTERVAL_PLACEHOLDER: &str = "__POLL_INTERVAL_MS__";

#[derive(Debug, Deserialize)]
pub(crate) struct ProgressQuery {
    run_id: Option<Uuid>,
}

fn parse_brief(body: Result<Json<ClientBrief>, JsonRejection>) -> Result<ClientBrief, ApiError> {
    body.map(|Json(brief)| brief)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Turn a terminal record into the generation envelope.
fn finished_response(record: RunRecord) -> Result<Json<GenerateResponse>, ApiError> {
    match (record.status, record.result) {
        (RunStatus::Succeeded, Some(proposal)) => Ok(Json(GenerateResponse::ok(
            record.id,
            proposal.to_markdown(),
        ))),
        _ => Err(ApiError::RunFailed(
            record.error.unwrap_or_else(|| "Generation failed".to_string()),
        )),
    }
}

/// `POST /generate`: run the pipeline and answer with the finished proposal.
///
/// The run keeps going in the background if the wait times out; its id is
/// in the 504 message so a client can keep polling.
pub(crate) async fn generate(
    State(state): State<AppState>,
    body: Result<Json<ClientBrief>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let brief = parse_brief(body)?;
    let run_id = state.registry.submit(brief).await?;
    let handle = state
        .registry
        .handle(run_id)
        .await
        .ok_or(ApiError::NotFound(run_id))?;

    let record = tokio::time::timeout(state.generate_timeout, handle.wait_terminal())
        .await
        .map_err(|_| {
            warn!(%run_id, "Generation wait timed out");
            ApiError::Timeout {
                run_id,
                secs: state.generate_timeout.as_secs(),
            }
        })?;

    info!(%run_id, status = ?record.status, "Generation request finished");
    finished_response(record)
}

/// `GET /api/progress[?run_id=<uuid>]`
pub(crate) async fn progress(
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> Json<ProgressSnapshot> {
    Json(state.reporter.get_progress(query.run_id).await)
}

/// `POST /api/runs`: start a run without waiting for it.
pub(crate) async fn submit_run(
    State(state): State<AppState>,
    body: Result<Json<ClientBrief>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let brief = parse_brief(body)?;
    let run_id = state.registry.submit(brief).await?;
    Ok((StatusCode::ACCEPTED, Json(SubmitResponse { run_id })))
}

/// `GET /api/runs`: snapshots of every held run, oldest first.
pub(crate) async fn list_runs(State(state): State<AppState>) -> Json<Vec<ProgressSnapshot>> {
    Json(state.registry.list().await)
}

/// `GET /api/runs/{id}/result`
///
/// Finished runs answer 200 with the envelope; `success` tells the outcome
/// apart. Runs still in progress answer 409.
pub(crate) async fn run_result(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let handle = state
        .registry
        .handle(run_id)
        .await
        .ok_or(ApiError::NotFound(run_id))?;

    let record = handle.record();
    if !record.is_terminal() {
        return Err(ApiError::Conflict(format!("Run {run_id} is still running")));
    }

    match finished_response(record) {
        Ok(response) => Ok(response),
        Err(err) => Ok(Json(GenerateResponse::err(err.to_string()))),
    }
}

/// `POST /api/runs/{id}/cancel`
pub(crate) async fn cancel_run(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.registry.cancel(run_id).await?;
    Ok((StatusCode::ACCEPTED, Json(SubmitResponse { run_id })))
}

/// `GET /api/templates`
pub(crate) async fn templates(State(state): State<AppState>) -> Json<Vec<TemplateSummary>> {
    let summaries = state
        .registry
        .engine()
        .templates()
        .into_iter()
        .map(|template| TemplateSummary {
            name: template.name.clone(),
            description: template.description.clone(),
            stages: template.stage_names(),
        })
        .collect();
    Json(summaries)
}

/// `GET /`: the web client.
pub(crate) async fn index(State(state): State<AppState>) -> Html<String> {
    Html(INDEX_HTML.replace(
        POLL_INTERVAL_PLACEHOLDER,
        &state.poll_interval_ms.to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_protocol::proposal_models::Proposal;
    use std::sync::Arc;

    fn record(status: RunStatus) -> RunRecord {
        let state = pg_core::state::ProgressState::new("default", vec!["only".to_string()]);
        let mut record = state.record();
        record.status = status;
        record
    }

    #[test]
    fn test_finished_response_success() {
        let mut done = record(RunStatus::Succeeded);
        done.result = Some(Arc::new(Proposal {
            title: "Project Proposal: Acme".to_string(),
            sections: vec![],
        }));

        let Json(response) = finished_response(done.clone()).unwrap();

        assert!(response.success);
        let data = response.data.unwrap();
        assert_eq!(data.run_id, Some(done.id));
        assert!(data.content.starts_with("# Project Proposal: Acme"));
    }

    #[test]
    fn test_finished_response_failure_carries_error() {
        let mut failed = record(RunStatus::Failed);
        failed.error = Some("cost-estimation failed: boom".to_string());

        let err = finished_response(failed).unwrap_err();

        assert_eq!(err, ApiError::RunFailed("cost-estimation failed: boom".into()));
    }

    #[test]
    fn test_index_has_no_placeholder_left() {
        let page = INDEX_HTML.replace(POLL_INTERVAL_PLACEHOLDER, "1000");
        assert!(INDEX_HTML.contains(POLL_INTERVAL_PLACEHOLDER));
        assert!(!page.contains(POLL_INTERVAL_PLACEHOLDER));
        assert!(page.contains("/api/progress"));
    }
}
