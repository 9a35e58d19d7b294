//! Engine event protocol.
//!
//! The pipeline engine can report its progress to in-process consumers
//! (the CLI's `run` command) over a channel, in addition to the shared
//! progress state that HTTP pollers read.
//!
//! Uses tagged enum serialization for TypeScript compatibility:
//! ```json
//! {
//!   "type": "stageCompleted",
//!   "payload": {
//!     "run_id": "uuid-here",
//!     "stage": "cost-estimation",
//!     "progress": 80
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Events sent from the pipeline engine to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// A run has started executing.
    RunStarted {
        #[ts(type = "string")]
        run_id: Uuid,
        template: String,
        stages: Vec<String>,
    },

    /// A stage is about to execute.
    StageStarted {
        #[ts(type = "string")]
        run_id: Uuid,
        stage: String,
        status: String,
    },

    /// A stage finished successfully.
    StageCompleted {
        #[ts(type = "string")]
        run_id: Uuid,
        stage: String,
        progress: u8,
    },

    /// All stages finished and the proposal was assembled.
    RunCompleted {
        #[ts(type = "string")]
        run_id: Uuid,
    },

    /// The run stopped on an error.
    RunFailed {
        #[ts(type = "string")]
        run_id: Uuid,
        error: String,
    },
}

impl Event {
    pub fn run_id(&self) -> Uuid {
        match self {
            Event::RunStarted { run_id, .. }
            | Event::StageStarted { run_id, .. }
            | Event::StageCompleted { run_id, .. }
            | Event::RunCompleted { run_id }
            | Event::RunFailed { run_id, .. } => *run_id,
        }
    }
}
