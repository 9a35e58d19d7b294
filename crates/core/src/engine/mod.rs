//! Pipeline execution engine.
//!
//! The PipelineEngine resolves templates into stage plans and drives a plan
//! to a terminal state: stages run one at a time in plan order, every
//! transition goes through the run's [`ProgressState`], and the first stage
//! failure ends the run.

pub mod error;
pub mod plan;

pub use error::EngineError;
pub use plan::{StageDescriptor, StagePlan};

use crate::stages::base::{CompletedStage, StageContext, StageError, StageOutput, StageUnit};
use crate::stages::registry::StageRegistry;
use crate::state::progress::{ProgressState, StateError};
use pg_protocol::brief_models::ClientBrief;
use pg_protocol::ipc::Event;
use pg_protocol::pipeline_models::PipelineTemplate;
use pg_protocol::proposal_models::{Proposal, ProposalSection};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use tracing::{debug, error, info, warn};

/// Error message recorded on runs stopped through a [`CancelFlag`].
pub const CANCELLED_MESSAGE: &str = "Run cancelled";

/// Cooperative cancellation, checked by the engine between stages.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Terminal result of [`PipelineEngine::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Succeeded(Arc<Proposal>),
    Failed(String),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Succeeded(_))
    }
}

/// Progress after `completed` of `total` stages: `round(100 * completed / total)`,
/// kept below 100 until the run completes.
pub fn stage_progress(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (200 * completed + total) / (2 * total);
    rounded.min(99) as u8
}

/// The main pipeline execution engine.
pub struct PipelineEngine {
    registry: StageRegistry,
    templates: BTreeMap<String, PipelineTemplate>,
}

impl PipelineEngine {
    /// Create an engine, rejecting any template that names an unknown stage
    /// or repeats one.
    pub fn new(
        registry: StageRegistry,
        templates: Vec<PipelineTemplate>,
    ) -> Result<Self, EngineError> {
        let mut by_name = BTreeMap::new();
        for template in templates {
            plan::validate_template(&registry, &template)?;
            by_name.insert(template.name.clone(), template);
        }
        Ok(Self {
            registry,
            templates: by_name,
        })
    }

    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    /// Known templates, sorted by name.
    pub fn templates(&self) -> Vec<&PipelineTemplate> {
        self.templates.values().collect()
    }

    pub fn template(&self, name: &str) -> Option<&PipelineTemplate> {
        self.templates.get(name)
    }

    /// Resolve the stage plan a brief asks for.
    pub fn plan(&self, brief: &ClientBrief) -> Result<StagePlan, EngineError> {
        let name = brief.template_name();
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| EngineError::UnknownTemplate(name.to_string()))?;
        plan::resolve(&self.registry, template, &brief.analysis_options)
    }

    /// Execute `plan` to a terminal state.
    ///
    /// Stage failures never escape: they are recorded on `state` and
    /// returned as [`RunOutcome::Failed`].
    pub async fn run(
        &self,
        plan: &StagePlan,
        state: &ProgressState,
        brief: Arc<ClientBrief>,
        cancel: &CancelFlag,
        events_tx: Option<&Sender<Event>>,
    ) -> RunOutcome {
        let run_id = state.id();

        if let Err(e) = state.start() {
            return abandon(state, e, events_tx).await;
        }
        info!(%run_id, template = %plan.template, stages = plan.len(), "Run started");
        emit(
            events_tx,
            Event::RunStarted {
                run_id,
                template: plan.template.clone(),
                stages: plan.stage_names(),
            },
        )
        .await;

        let mut context = StageContext::new(run_id, brief);
        let total = plan.len();

        for (index, stage) in plan.stages.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(%run_id, stage = %stage.name, "Run cancelled before stage");
                return fail(state, CANCELLED_MESSAGE.to_string(), events_tx).await;
            }

            let status_text = format!("Running {}", stage.title);
            if let Err(e) = state.begin_stage(&stage.name, &status_text) {
                return abandon(state, e, events_tx).await;
            }
            debug!(%run_id, stage = %stage.name, "Stage started");
            emit(
                events_tx,
                Event::StageStarted {
                    run_id,
                    stage: stage.name.clone(),
                    status: status_text,
                },
            )
            .await;

            let output = match execute_isolated(&stage.unit, &context).await {
                Ok(output) => output,
                Err(e) => {
                    warn!(%run_id, stage = %stage.name, error = %e, "Stage failed");
                    let message = format!("{} failed: {}", stage.name, e);
                    return fail(state, message, events_tx).await;
                }
            };

            let progress = stage_progress(index + 1, total);
            let completed_text = format!("Completed {}", stage.title);
            if let Err(e) = state.advance(&stage.name, progress, &completed_text) {
                return abandon(state, e, events_tx).await;
            }
            debug!(%run_id, stage = %stage.name, progress, "Stage completed");
            emit(
                events_tx,
                Event::StageCompleted {
                    run_id,
                    stage: stage.name.clone(),
                    progress,
                },
            )
            .await;

            context.previous.push(CompletedStage {
                name: stage.name.clone(),
                title: stage.title.clone(),
                output,
            });
        }

        let proposal = assemble(&context);
        if let Err(e) = state.complete(proposal) {
            return abandon(state, e, events_tx).await;
        }
        info!(%run_id, "Run completed");
        emit(events_tx, Event::RunCompleted { run_id }).await;

        match state.record().result {
            Some(proposal) => RunOutcome::Succeeded(proposal),
            None => RunOutcome::Failed("completed run has no result".to_string()),
        }
    }
}

/// Build the proposal from the completed stages, in execution order.
fn assemble(context: &StageContext) -> Proposal {
    Proposal {
        title: format!("Project Proposal: {}", context.brief.display_name()),
        sections: context
            .previous
            .iter()
            .map(|completed| ProposalSection {
                stage: completed.name.clone(),
                title: completed.title.clone(),
                content: completed.output.content.clone(),
            })
            .collect(),
    }
}

async fn emit(events_tx: Option<&Sender<Event>>, event: Event) {
    if let Some(tx) = events_tx {
        let _ = tx.send(event).await;
    }
}

async fn fail(
    state: &ProgressState,
    message: String,
    events_tx: Option<&Sender<Event>>,
) -> RunOutcome {
    let run_id = state.id();
    if let Err(e) = state.fail(message.clone()) {
        error!(%run_id, error = %e, "Could not record run failure");
    }
    emit(
        events_tx,
        Event::RunFailed {
            run_id,
            error: message.clone(),
        },
    )
    .await;
    RunOutcome::Failed(message)
}

/// A transition the engine itself requested was rejected.
async fn abandon(
    state: &ProgressState,
    error: StateError,
    events_tx: Option<&Sender<Event>>,
) -> RunOutcome {
    error!(run_id = %state.id(), error = %error, "Invalid progress transition");
    let record = state.record();
    if record.is_terminal() {
        return match (record.result, record.error) {
            (Some(proposal), _) => RunOutcome::Succeeded(proposal),
            (None, message) => RunOutcome::Failed(message.unwrap_or_else(|| error.to_string())),
        };
    }
    fail(state, error.to_string(), events_tx).await
}

/// Runs one stage on its own task. A panic inside the unit surfaces as a
/// stage error instead of unwinding through the run.
async fn execute_isolated(
    unit: &Arc<dyn StageUnit>,
    context: &StageContext,
) -> Result<StageOutput, StageError> {
    let unit = Arc::clone(unit);
    let context = context.clone();
    match tokio::spawn(async move { unit.execute(&context).await }).await {
        Ok(result) => result,
        Err(join_error) if join_error.is_panic() => {
            let payload = join_error.into_panic();
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown cause".to_string());
            Err(StageError::ExecutionError(format!("stage panicked: {detail}")))
        }
        Err(join_error) => Err(StageError::ExecutionError(join_error.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::scripted::ScriptedStage;
    use pg_protocol::pipeline_models::StageStep;
    use pg_protocol::run_models::RunStatus;
    use tokio::sync::mpsc;

    fn template(name: &str, stages: &[&str]) -> PipelineTemplate {
        PipelineTemplate {
            name: name.to_string(),
            description: String::new(),
            stages: stages
                .iter()
                .map(|s| StageStep::Named(s.to_string()))
                .collect(),
        }
    }

    struct PanickingStage;

    #[async_trait::async_trait]
    impl StageUnit for PanickingStage {
        fn name(&self) -> &str {
            "explodes"
        }

        fn title(&self) -> &str {
            "Explodes"
        }

        async fn execute(&self, _context: &StageContext) -> Result<StageOutput, StageError> {
            panic!("index out of range");
        }
    }

    fn brief() -> Arc<ClientBrief> {
        Arc::new(ClientBrief {
            client_name: "Acme".to_string(),
            template: Some("t".to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_stage_progress() {
        assert_eq!(stage_progress(0, 5), 0);
        assert_eq!(stage_progress(2, 5), 40);
        assert_eq!(stage_progress(1, 3), 33);
        assert_eq!(stage_progress(2, 3), 67);
        assert_eq!(stage_progress(5, 5), 99);
        assert_eq!(stage_progress(0, 0), 0);
    }

    #[test]
    fn test_engine_new_rejects_unknown_stage() {
        let result = PipelineEngine::new(StageRegistry::new(), vec![template("t", &["missing"])]);
        assert!(matches!(result, Err(EngineError::UnknownStage { .. })));
    }

    #[test]
    fn test_plan_unknown_template() {
        let engine = PipelineEngine::new(StageRegistry::with_builtin(), vec![]).unwrap();
        let result = engine.plan(&brief());
        assert_eq!(result.unwrap_err(), EngineError::UnknownTemplate("t".to_string()));
    }

    #[tokio::test]
    async fn test_engine_simple_execution() {
        let registry = StageRegistry::new()
            .with_stage(ScriptedStage::success("a", "first"))
            .with_stage(ScriptedStage::success("b", "second"));
        let engine = PipelineEngine::new(registry, vec![template("t", &["a", "b"])]).unwrap();
        let plan = engine.plan(&brief()).unwrap();
        let state = ProgressState::new(&plan.template, plan.stage_names());

        let outcome = engine
            .run(&plan, &state, brief(), &CancelFlag::new(), None)
            .await;

        let RunOutcome::Succeeded(proposal) = outcome else {
            panic!("expected success, got {outcome:?}");
        };
        assert_eq!(proposal.title, "Project Proposal: Acme");
        assert_eq!(proposal.sections.len(), 2);
        assert_eq!(proposal.sections[1].content, "second");
        assert_eq!(state.record().status, RunStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_engine_cancelled_before_first_stage() {
        let stage = ScriptedStage::success("a", "first");
        let registry = StageRegistry::new().with_stage(stage.clone());
        let engine = PipelineEngine::new(registry, vec![template("t", &["a"])]).unwrap();
        let plan = engine.plan(&brief()).unwrap();
        let state = ProgressState::new(&plan.template, plan.stage_names());
        let cancel = CancelFlag::new();
        cancel.cancel();

        let outcome = engine.run(&plan, &state, brief(), &cancel, None).await;

        assert_eq!(outcome, RunOutcome::Failed(CANCELLED_MESSAGE.to_string()));
        assert_eq!(stage.calls(), 0);
    }

    #[tokio::test]
    async fn test_engine_event_emission() {
        let registry = StageRegistry::new()
            .with_stage(ScriptedStage::success("a", "first"))
            .with_stage(ScriptedStage::failing("b", "boom"));
        let engine = PipelineEngine::new(registry, vec![template("t", &["a", "b"])]).unwrap();
        let plan = engine.plan(&brief()).unwrap();
        let state = ProgressState::new(&plan.template, plan.stage_names());
        let (tx, mut rx) = mpsc::channel(100);

        let outcome = engine
            .run(&plan, &state, brief(), &CancelFlag::new(), Some(&tx))
            .await;
        drop(tx);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert_eq!(
            outcome,
            RunOutcome::Failed("b failed: Execution failed: boom".to_string())
        );
        assert!(matches!(&events[0], Event::RunStarted { stages, .. } if stages.len() == 2));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::StageCompleted { stage, progress: 50, .. } if stage == "a"
        )));
        assert!(matches!(events.last(), Some(Event::RunFailed { .. })));
        assert!(events.iter().all(|e| e.run_id() == state.id()));
    }

    #[tokio::test]
    async fn test_engine_panicking_stage_fails_run() {
        let registry = StageRegistry::new()
            .with_stage(ScriptedStage::success("a", "first"))
            .with_stage(PanickingStage);
        let engine = PipelineEngine::new(registry, vec![template("t", &["a", "explodes"])]).unwrap();
        let plan = engine.plan(&brief()).unwrap();
        let state = ProgressState::new(&plan.template, plan.stage_names());
        let (tx, mut rx) = mpsc::channel(100);

        let outcome = engine
            .run(&plan, &state, brief(), &CancelFlag::new(), Some(&tx))
            .await;
        drop(tx);

        let message = "explodes failed: Execution failed: stage panicked: index out of range";
        assert_eq!(outcome, RunOutcome::Failed(message.to_string()));
        let record = state.record();
        assert_eq!(record.status, RunStatus::Failed);
        assert_eq!(record.error.as_deref(), Some(message));
        assert_eq!(record.completed_steps, vec!["a"]);

        let mut last = None;
        while let Some(event) = rx.recv().await {
            last = Some(event);
        }
        assert!(matches!(last, Some(Event::RunFailed { .. })));
    }
}
