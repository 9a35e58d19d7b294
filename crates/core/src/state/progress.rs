//! Progress state machine for a single run.
//!
//! A run has exactly one writer, the [`ProgressState`] owned by the engine
//! task driving it, and any number of readers holding a [`ProgressHandle`].
//! Every transition builds the next [`RunRecord`] and publishes it whole
//! through a `watch` channel, so a reader sees either the record before a
//! transition or the one after it, never a mix of both.

use chrono::{DateTime, Utc};
use pg_protocol::proposal_models::Proposal;
use pg_protocol::run_models::{ProgressSnapshot, RunStatus};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Invalid transition for run {run_id}: {reason}")]
    InvalidTransition { run_id: Uuid, reason: String },
}

/// Full state of one pipeline run.
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: Uuid,

    /// Template the stage list was resolved from.
    pub template: String,

    /// Ordered stage names. Fixed at creation.
    pub stages: Vec<String>,

    pub status: RunStatus,

    /// Index of the next stage to complete, `0..=stages.len()`.
    pub current_index: usize,

    /// Names of completed stages, in completion order.
    pub completed_steps: Vec<String>,

    /// Percent complete, `0..=100`. Only a successful run reaches 100.
    pub progress: u8,

    /// Human-readable description of the current activity.
    pub status_text: String,

    /// Stage being executed; empty between stages.
    pub current_stage: String,

    pub error: Option<String>,

    /// Assembled proposal, present only once the run succeeded.
    pub result: Option<Arc<Proposal>>,

    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunRecord {
    fn new(id: Uuid, template: String, stages: Vec<String>) -> Self {
        Self {
            id,
            template,
            stages,
            status: RunStatus::Pending,
            current_index: 0,
            completed_steps: Vec::new(),
            progress: 0,
            status_text: "Queued".to_string(),
            current_stage: String::new(),
            error: None,
            result: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whole seconds since the run started, frozen once it finished.
    pub fn elapsed_secs(&self) -> u64 {
        let Some(started_at) = self.started_at else {
            return 0;
        };
        let end = self.finished_at.unwrap_or_else(Utc::now);
        u64::try_from((end - started_at).num_seconds()).unwrap_or(0)
    }

    /// Point-in-time view for pollers.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            progress: self.progress,
            status: self.status_text.clone(),
            current_stage: self.current_stage.clone(),
            completed_steps: self.completed_steps.clone(),
            error: self.error.clone(),
            run_id: Some(self.id),
            run_status: Some(self.status),
            elapsed_time: self.elapsed_secs(),
        }
    }

    fn expected_stage(&self, stage: &str) -> Result<(), String> {
        if self.status != RunStatus::Running {
            return Err(format!("run is {:?}, not running", self.status));
        }
        if self.completed_steps.iter().any(|done| done == stage) {
            return Err(format!("stage '{stage}' already completed"));
        }
        match self.stages.get(self.current_index) {
            Some(next) if next == stage => Ok(()),
            Some(next) if self.stages.iter().any(|s| s == stage) => Err(format!(
                "stage '{stage}' is out of order, expected '{next}'"
            )),
            Some(_) => Err(format!("unknown stage '{stage}'")),
            None => Err("all stages already completed".to_string()),
        }
    }
}

/// Writer side of a run's progress. Owned by the task executing the run.
#[derive(Debug)]
pub struct ProgressState {
    tx: watch::Sender<RunRecord>,
}

impl ProgressState {
    /// Create a pending run with a fresh id.
    pub fn new(template: impl Into<String>, stages: Vec<String>) -> Self {
        Self::with_id(Uuid::new_v4(), template, stages)
    }

    pub fn with_id(id: Uuid, template: impl Into<String>, stages: Vec<String>) -> Self {
        let (tx, _rx) = watch::channel(RunRecord::new(id, template.into(), stages));
        Self { tx }
    }

    pub fn id(&self) -> Uuid {
        self.tx.borrow().id
    }

    /// A new reader of this run.
    pub fn handle(&self) -> ProgressHandle {
        ProgressHandle {
            rx: self.tx.subscribe(),
        }
    }

    pub fn record(&self) -> RunRecord {
        self.tx.borrow().clone()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.tx.borrow().snapshot()
    }

    /// PENDING -> RUNNING.
    pub fn start(&self) -> Result<(), StateError> {
        self.transition(|record| {
            if record.status != RunStatus::Pending {
                return Err(format!("run is {:?}, not pending", record.status));
            }
            record.status = RunStatus::Running;
            record.progress = 0;
            record.current_index = 0;
            record.status_text = "Starting proposal generation".to_string();
            record.started_at = Some(Utc::now());
            Ok(())
        })
    }

    /// Publish that `stage` is about to execute.
    pub fn begin_stage(&self, stage: &str, status_text: &str) -> Result<(), StateError> {
        self.transition(|record| {
            record.expected_stage(stage)?;
            record.current_stage = stage.to_string();
            record.status_text = status_text.to_string();
            Ok(())
        })
    }

    /// Record `stage` as completed and move to `percent`.
    ///
    /// `percent` must not decrease and must stay below 100; reaching 100 is
    /// reserved for [`complete`](Self::complete).
    pub fn advance(&self, stage: &str, percent: u8, status_text: &str) -> Result<(), StateError> {
        self.transition(|record| {
            record.expected_stage(stage)?;
            if percent < record.progress {
                return Err(format!(
                    "progress cannot decrease from {} to {percent}",
                    record.progress
                ));
            }
            if percent >= 100 {
                return Err("progress 100 is reserved for completion".to_string());
            }
            record.completed_steps.push(stage.to_string());
            record.current_index += 1;
            record.progress = percent;
            record.status_text = status_text.to_string();
            record.current_stage.clear();
            Ok(())
        })
    }

    /// Terminal failure. Progress and completed stages stay as they were.
    pub fn fail(&self, message: impl Into<String>) -> Result<(), StateError> {
        let message = message.into();
        self.transition(|record| {
            record.status = RunStatus::Failed;
            record.status_text = "Generation failed".to_string();
            record.error = Some(message);
            record.finished_at = Some(Utc::now());
            Ok(())
        })
    }

    /// Terminal success. Valid only after every stage advanced.
    pub fn complete(&self, result: Proposal) -> Result<(), StateError> {
        self.transition(|record| {
            if record.status != RunStatus::Running {
                return Err(format!("run is {:?}, not running", record.status));
            }
            if record.current_index != record.stages.len() {
                return Err(format!(
                    "{} of {} stages completed",
                    record.current_index,
                    record.stages.len()
                ));
            }
            record.status = RunStatus::Succeeded;
            record.progress = 100;
            record.status_text = "Proposal ready".to_string();
            record.current_stage.clear();
            record.result = Some(Arc::new(result));
            record.finished_at = Some(Utc::now());
            Ok(())
        })
    }

    /// Apply `change` to a copy of the current record and publish it.
    /// On error nothing is published.
    fn transition<F>(&self, change: F) -> Result<(), StateError>
    where
        F: FnOnce(&mut RunRecord) -> Result<(), String>,
    {
        let mut next = self.tx.borrow().clone();
        if next.is_terminal() {
            return Err(StateError::InvalidTransition {
                run_id: next.id,
                reason: format!("run already finished as {:?}", next.status),
            });
        }

        if let Err(reason) = change(&mut next) {
            return Err(StateError::InvalidTransition {
                run_id: next.id,
                reason,
            });
        }

        self.tx.send_replace(next);
        Ok(())
    }
}

/// Reader side of a run's progress. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ProgressHandle {
    rx: watch::Receiver<RunRecord>,
}

impl ProgressHandle {
    pub fn id(&self) -> Uuid {
        self.rx.borrow().id
    }

    pub fn record(&self) -> RunRecord {
        self.rx.borrow().clone()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.rx.borrow().snapshot()
    }

    pub fn status(&self) -> RunStatus {
        self.rx.borrow().status
    }

    pub fn result(&self) -> Option<Arc<Proposal>> {
        self.rx.borrow().result.clone()
    }

    /// Wait until the run is terminal and return its final record.
    ///
    /// If the writer goes away first, the last published record is returned
    /// as is.
    pub async fn wait_terminal(&self) -> RunRecord {
        let mut rx = self.rx.clone();
        let record = match rx.wait_for(|record| record.is_terminal()).await {
            Ok(record) => record.clone(),
            Err(_) => self.rx.borrow().clone(),
        };
        record
    }
}
