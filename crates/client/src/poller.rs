//! Client-side progress poller.
//!
//! The poller fetches a run's progress on a fixed interval and hands each
//! snapshot to a [`ProgressView`]. Only one fetch is ever in flight: the
//! next one is scheduled after the previous one settled, never on a free
//! running timer.
//!
//! Polling stops when:
//! - the run reaches 100% (success)
//! - the snapshot carries an error (the run failed)
//! - a fetch fails, answers non-2xx, or returns a malformed body
//!
//! In the last two cases the view's error display is invoked exactly once.
//! Dropping the future returned by [`Poller::run`] also stops polling.

use crate::error::ClientError;
use async_trait::async_trait;
use pg_protocol::run_models::ProgressSnapshot;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Default delay between polls.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

/// Where snapshots come from.
#[async_trait]
pub trait ProgressSource: Send + Sync {
    async fn fetch_progress(&self, run_id: Option<Uuid>) -> Result<ProgressSnapshot, ClientError>;
}

/// Where snapshots go.
pub trait ProgressView: Send {
    /// Show the latest snapshot.
    fn render(&mut self, snapshot: &ProgressSnapshot);

    /// Show a terminal error. Called at most once per poll loop.
    fn show_error(&mut self, message: &str);
}

/// How a poll loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The run reached 100%.
    Succeeded(ProgressSnapshot),

    /// The run reported an error.
    RunFailed(ProgressSnapshot),

    /// Polling itself failed.
    Aborted(ClientError),
}

/// Interval-driven progress poller for one run.
pub struct Poller {
    source: Arc<dyn ProgressSource>,
    interval: Duration,
    run_id: Option<Uuid>,
}

impl Poller {
    pub fn new(source: Arc<dyn ProgressSource>) -> Self {
        Self {
            source,
            interval: DEFAULT_INTERVAL,
            run_id: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Follow `run_id` only. Snapshots of other runs are discarded as stale.
    ///
    /// Without a run id the poller follows whatever the server reports as
    /// its latest run.
    pub fn tracking(mut self, run_id: Uuid) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Poll until the run is terminal or polling fails.
    pub async fn run(&self, view: &mut dyn ProgressView) -> PollOutcome {
        loop {
            match self.source.fetch_progress(self.run_id).await {
                Ok(snapshot) => match self.classify(snapshot) {
                    Step::Stale => debug!("Discarded snapshot of another run"),
                    Step::Pending(snapshot) => view.render(&snapshot),
                    Step::Succeeded(snapshot) => {
                        view.render(&snapshot);
                        return PollOutcome::Succeeded(snapshot);
                    }
                    Step::RunFailed(snapshot) => {
                        view.render(&snapshot);
                        let message = snapshot.error.clone().unwrap_or_default();
                        view.show_error(&message);
                        return PollOutcome::RunFailed(snapshot);
                    }
                    Step::Lost(err) => return abort(view, err),
                },
                Err(err) => return abort(view, err),
            }

            tokio::time::sleep(self.interval).await;
        }
    }

    fn classify(&self, snapshot: ProgressSnapshot) -> Step {
        if let Some(tracked) = self.run_id {
            match snapshot.run_id {
                Some(id) if id != tracked => return Step::Stale,
                None => return Step::Lost(ClientError::RunNotFound(tracked)),
                Some(_) => {}
            }
        }

        if snapshot.error.is_some() {
            Step::RunFailed(snapshot)
        } else if snapshot.progress >= 100 {
            Step::Succeeded(snapshot)
        } else {
            Step::Pending(snapshot)
        }
    }
}

enum Step {
    Stale,
    Pending(ProgressSnapshot),
    Succeeded(ProgressSnapshot),
    RunFailed(ProgressSnapshot),
    Lost(ClientError),
}

fn abort(view: &mut dyn ProgressView, err: ClientError) -> PollOutcome {
    warn!(error = %err, "Progress polling stopped");
    view.show_error(&err.to_string());
    PollOutcome::Aborted(err)
}
