//! Run lifecycle and progress snapshot models.
//!
//! This module defines the structures that describe the state of a pipeline
//! run as seen by polling clients.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Represents the current lifecycle status of a pipeline run.
///
/// The status progresses through these states:
/// Pending -> Running -> (Succeeded | Failed)
///
/// `Succeeded` and `Failed` are terminal: once reached, the run never
/// changes again.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// Run has been created but not started yet.
    Pending,

    /// Run is executing its stages.
    Running,

    /// Every stage completed and the proposal was assembled.
    Succeeded,

    /// A stage failed or the run was cancelled.
    Failed,
}

impl RunStatus {
    /// Whether this status is absorbing.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Succeeded | RunStatus::Failed)
    }
}

/// Immutable point-in-time view of a run, as served by `GET /api/progress`.
///
/// Only `progress` and `completed_steps` are required when deserializing;
/// a body missing either is rejected, everything else falls back to its
/// default.
///
/// # Example
///
/// ```json
/// {
///   "progress": 40,
///   "status": "Running Architecture Design",
///   "current_stage": "architecture-design",
///   "completed_steps": ["requirements-analysis", "competitive-research"],
///   "error": null
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct ProgressSnapshot {
    /// Overall completion, 0 to 100.
    pub progress: u8,

    /// Human-readable description of the current activity.
    #[serde(default)]
    pub status: String,

    /// Name of the stage being executed, empty between stages.
    #[serde(default)]
    pub current_stage: String,

    /// Stage names already finished, in execution order.
    pub completed_steps: Vec<String>,

    /// Terminal error message, if the run failed.
    #[serde(default)]
    pub error: Option<String>,

    /// Run this snapshot belongs to. Absent for the idle snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub run_id: Option<Uuid>,

    /// Lifecycle status of the run. Absent for the idle snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_status: Option<RunStatus>,

    /// Seconds since the run started.
    #[serde(default)]
    #[ts(type = "number")]
    pub elapsed_time: u64,
}

impl ProgressSnapshot {
    /// The snapshot reported when no run has ever started.
    pub fn idle() -> Self {
        Self {
            progress: 0,
            status: String::new(),
            current_stage: String::new(),
            completed_steps: Vec::new(),
            error: None,
            run_id: None,
            run_status: None,
            elapsed_time: 0,
        }
    }

    /// Whether a poller should stop after rendering this snapshot.
    pub fn is_terminal(&self) -> bool {
        self.error.is_some() || self.progress >= 100
    }
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}
