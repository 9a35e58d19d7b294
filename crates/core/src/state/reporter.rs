//! Read-only progress queries for pollers.

use crate::state::manager::RunRegistry;
use pg_protocol::run_models::ProgressSnapshot;
use std::sync::Arc;
use uuid::Uuid;

/// Answers progress queries from the run registry.
#[derive(Clone)]
pub struct ProgressReporter {
    registry: Arc<RunRegistry>,
}

impl ProgressReporter {
    pub fn new(registry: Arc<RunRegistry>) -> Self {
        Self { registry }
    }

    /// Snapshot of `run_id`, or of the most recently submitted run when no
    /// id is given. Unknown or absent runs report the idle snapshot.
    pub async fn get_progress(&self, run_id: Option<Uuid>) -> ProgressSnapshot {
        let run_id = match run_id {
            Some(run_id) => Some(run_id),
            None => self.registry.latest_id().await,
        };

        match run_id {
            Some(run_id) => self
                .registry
                .snapshot(run_id)
                .await
                .unwrap_or_else(ProgressSnapshot::idle),
            None => ProgressSnapshot::idle(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PipelineEngine;
    use crate::stages::registry::StageRegistry;

    fn reporter() -> ProgressReporter {
        let engine = PipelineEngine::new(StageRegistry::with_builtin(), vec![]).unwrap();
        ProgressReporter::new(Arc::new(RunRegistry::new(engine, 8)))
    }

    #[tokio::test]
    async fn test_idle_before_any_run() {
        let snapshot = reporter().get_progress(None).await;

        assert_eq!(snapshot, ProgressSnapshot::idle());
        assert_eq!(snapshot.progress, 0);
        assert!(snapshot.completed_steps.is_empty());
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_idle_for_unknown_run() {
        let snapshot = reporter().get_progress(Some(Uuid::new_v4())).await;
        assert_eq!(snapshot, ProgressSnapshot::idle());
    }
}
