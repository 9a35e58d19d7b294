//! reqwest-based client for the proposal server's HTTP API.

use crate::error::ClientError;
use crate::poller::ProgressSource;
use async_trait::async_trait;
use pg_protocol::api_models::{GenerateData, GenerateResponse, SubmitResponse, TemplateSummary};
use pg_protocol::brief_models::ClientBrief;
use pg_protocol::run_models::ProgressSnapshot;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

const USER_AGENT: &str = concat!("proposal-kit/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout. Covers `POST /generate`, which waits for
/// the whole pipeline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for one proposal server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport {
                url: base_url.clone(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Start a run and return its id without waiting for it.
    pub async fn submit(&self, brief: &ClientBrief) -> Result<Uuid, ClientError> {
        let url = self.url("/api/runs");
        let response = send(&url, self.client.post(&url).json(brief)).await?;
        let SubmitResponse { run_id } = decode(&url, response).await?;
        debug!(%run_id, "Run submitted");
        Ok(run_id)
    }

    /// Run a brief through `POST /generate` and wait for the proposal.
    pub async fn generate(&self, brief: &ClientBrief) -> Result<GenerateData, ClientError> {
        let url = self.url("/generate");
        let response = send(&url, self.client.post(&url).json(brief)).await?;
        let envelope: GenerateResponse = decode(&url, response).await?;
        unwrap_envelope(&url, envelope)
    }

    /// Progress of `run_id`, or of the server's latest run.
    pub async fn progress(&self, run_id: Option<Uuid>) -> Result<ProgressSnapshot, ClientError> {
        let url = match run_id {
            Some(run_id) => self.url(&format!("/api/progress?run_id={run_id}")),
            None => self.url("/api/progress"),
        };
        let response = send(&url, self.client.get(&url)).await?;
        decode(&url, response).await
    }

    /// Markdown of a finished run.
    pub async fn result(&self, run_id: Uuid) -> Result<GenerateData, ClientError> {
        let url = self.url(&format!("/api/runs/{run_id}/result"));
        let response = send(&url, self.client.get(&url)).await?;
        let envelope: GenerateResponse = decode(&url, response).await?;
        unwrap_envelope(&url, envelope)
    }

    pub async fn cancel(&self, run_id: Uuid) -> Result<(), ClientError> {
        let url = self.url(&format!("/api/runs/{run_id}/cancel"));
        let response = send(&url, self.client.post(&url)).await?;
        let _: SubmitResponse = decode(&url, response).await?;
        Ok(())
    }

    pub async fn templates(&self) -> Result<Vec<TemplateSummary>, ClientError> {
        let url = self.url("/api/templates");
        let response = send(&url, self.client.get(&url)).await?;
        decode(&url, response).await
    }
}

#[async_trait]
impl ProgressSource for ApiClient {
    async fn fetch_progress(&self, run_id: Option<Uuid>) -> Result<ProgressSnapshot, ClientError> {
        self.progress(run_id).await
    }
}

async fn send(url: &str, request: reqwest::RequestBuilder) -> Result<Response, ClientError> {
    request.send().await.map_err(|e| ClientError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Check the status and parse the body as `T`.
///
/// Error statuses carrying a `{success: false, error}` envelope surface the
/// server's message.
async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await.map_err(|e| ClientError::Transport {
        url: url.to_string(),
        message: format!("failed to read body: {e}"),
    })?;

    if !status.is_success() {
        let message = serde_json::from_str::<GenerateResponse>(&body)
            .ok()
            .and_then(|envelope| envelope.error);
        return Err(ClientError::Http {
            url: url.to_string(),
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| ClientError::Malformed {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn unwrap_envelope(url: &str, envelope: GenerateResponse) -> Result<GenerateData, ClientError> {
    match envelope {
        GenerateResponse {
            success: true,
            data: Some(data),
            ..
        } => Ok(data),
        GenerateResponse {
            success: true,
            data: None,
            ..
        } => Err(ClientError::Malformed {
            url: url.to_string(),
            reason: "successful response without data".to_string(),
        }),
        GenerateResponse { error, .. } => Err(ClientError::Rejected(
            error.unwrap_or_else(|| "Generation failed".to_string()),
        )),
    }
}
