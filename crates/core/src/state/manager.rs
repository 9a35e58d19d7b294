//! Run registry for coordinating concurrent pipeline runs.
//!
//! The RunRegistry is the entry point for starting runs. It validates a
//! brief, resolves its stage plan, registers the run under a fresh id and
//! executes it on its own tokio task. Readers look runs up by id and get a
//! [`ProgressHandle`]; the registry itself never mutates a run.

use crate::engine::{CancelFlag, EngineError, PipelineEngine};
use crate::state::progress::{ProgressHandle, ProgressState};
use pg_protocol::brief_models::{BriefError, ClientBrief};
use pg_protocol::ipc::Event;
use pg_protocol::run_models::ProgressSnapshot;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error(transparent)]
    InvalidBrief(#[from] BriefError),

    #[error(transparent)]
    Plan(#[from] EngineError),

    #[error("Run {0} not found")]
    NotFound(Uuid),

    #[error("Run {0} already finished")]
    AlreadyFinished(Uuid),
}

struct RunEntry {
    handle: ProgressHandle,
    cancel: CancelFlag,
}

#[derive(Default)]
struct RunTable {
    entries: HashMap<Uuid, RunEntry>,
    /// Run ids in submission order.
    order: VecDeque<Uuid>,
    latest: Option<Uuid>,
}

impl RunTable {
    /// Drop the oldest finished runs until at most `keep` remain.
    /// Runs still in progress are never dropped.
    fn evict_finished(&mut self, keep: usize) {
        let finished: Vec<Uuid> = self
            .order
            .iter()
            .filter(|id| {
                self.entries
                    .get(*id)
                    .is_some_and(|entry| entry.handle.status().is_terminal())
            })
            .copied()
            .collect();

        let excess = finished.len().saturating_sub(keep);
        for id in finished.into_iter().take(excess) {
            self.entries.remove(&id);
            self.order.retain(|other| *other != id);
            if self.latest == Some(id) {
                self.latest = None;
            }
            debug!(run_id = %id, "Evicted finished run");
        }
    }
}

/// Registry of pipeline runs, keyed by run id.
pub struct RunRegistry {
    runs: Arc<RwLock<RunTable>>,

    engine: Arc<PipelineEngine>,

    /// Optional channel for in-process observers of engine events.
    events_tx: Option<mpsc::Sender<Event>>,

    /// How many finished runs stay queryable.
    max_finished_runs: usize,
}

impl RunRegistry {
    /// `max_finished_runs` is raised to 1 so the run that just ended stays
    /// queryable.
    pub fn new(engine: PipelineEngine, max_finished_runs: usize) -> Self {
        Self {
            runs: Arc::new(RwLock::new(RunTable::default())),
            engine: Arc::new(engine),
            events_tx: None,
            max_finished_runs: max_finished_runs.max(1),
        }
    }

    /// Forward engine events of every run to `events_tx`.
    pub fn with_events(mut self, events_tx: mpsc::Sender<Event>) -> Self {
        self.events_tx = Some(events_tx);
        self
    }

    pub fn engine(&self) -> &PipelineEngine {
        &self.engine
    }

    /// Validate `brief`, register a new run and start it in the background.
    ///
    /// The run is visible to readers before this returns.
    pub async fn submit(&self, brief: ClientBrief) -> Result<Uuid, RegistryError> {
        brief.validate()?;
        let plan = self.engine.plan(&brief)?;

        let state = ProgressState::new(plan.template.clone(), plan.stage_names());
        let run_id = state.id();
        let cancel = CancelFlag::new();

        {
            let mut runs = self.runs.write().await;
            runs.evict_finished(self.max_finished_runs);
            runs.entries.insert(
                run_id,
                RunEntry {
                    handle: state.handle(),
                    cancel: cancel.clone(),
                },
            );
            runs.order.push_back(run_id);
            runs.latest = Some(run_id);
        }
        info!(%run_id, template = %plan.template, "Run submitted");

        let engine = Arc::clone(&self.engine);
        let runs = Arc::clone(&self.runs);
        let events_tx = self.events_tx.clone();
        let keep = self.max_finished_runs;
        let brief = Arc::new(brief);

        tokio::spawn(async move {
            engine
                .run(&plan, &state, brief, &cancel, events_tx.as_ref())
                .await;
            runs.write().await.evict_finished(keep);
        });

        Ok(run_id)
    }

    pub async fn handle(&self, run_id: Uuid) -> Option<ProgressHandle> {
        let runs = self.runs.read().await;
        runs.entries.get(&run_id).map(|entry| entry.handle.clone())
    }

    pub async fn snapshot(&self, run_id: Uuid) -> Option<ProgressSnapshot> {
        let runs = self.runs.read().await;
        runs.entries.get(&run_id).map(|entry| entry.handle.snapshot())
    }

    /// Id of the most recently submitted run still held.
    pub async fn latest_id(&self) -> Option<Uuid> {
        self.runs.read().await.latest
    }

    /// Ask a run to stop before its next stage.
    pub async fn cancel(&self, run_id: Uuid) -> Result<(), RegistryError> {
        let runs = self.runs.read().await;
        let entry = runs
            .entries
            .get(&run_id)
            .ok_or(RegistryError::NotFound(run_id))?;

        if entry.handle.status().is_terminal() {
            return Err(RegistryError::AlreadyFinished(run_id));
        }
        entry.cancel.cancel();
        info!(%run_id, "Run cancellation requested");
        Ok(())
    }

    /// Snapshots of every held run, oldest first.
    pub async fn list(&self) -> Vec<ProgressSnapshot> {
        let runs = self.runs.read().await;
        runs.order
            .iter()
            .filter_map(|id| runs.entries.get(id))
            .map(|entry| entry.handle.snapshot())
            .collect()
    }

    pub async fn run_count(&self) -> usize {
        self.runs.read().await.entries.len()
    }
}
