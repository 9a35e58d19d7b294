//! Integration tests for PipelineEngine.
//!
//! These tests verify that the PipelineEngine correctly:
//! - Executes stages sequentially, passing earlier outputs forward
//! - Publishes monotonic progress and stops at the first failure
//! - Leaves terminal runs untouchable
//! - Emits events through the optional channel

mod common;

use common::*;
use pg_core::engine::{CancelFlag, PipelineEngine, RunOutcome, CANCELLED_MESSAGE};
use pg_core::stages::{ScriptedStage, StageRegistry, StageUnit};
use pg_core::state::StateError;
use pg_protocol::proposal_models::Proposal;
use pg_protocol::run_models::RunStatus;
use std::sync::Arc;
use tokio::sync::mpsc;

fn five_stages() -> Vec<ScriptedStage> {
    (1..=5)
        .map(|i| ScriptedStage::success(&format!("stage-{i}"), &format!("Section {i} body")))
        .collect()
}

fn as_units(stages: &[ScriptedStage]) -> Vec<Arc<dyn StageUnit>> {
    stages
        .iter()
        .map(|s| Arc::new(s.clone()) as Arc<dyn StageUnit>)
        .collect()
}

#[tokio::test]
async fn test_five_stages_succeed() {
    let stages = five_stages();
    let engine = engine_with(as_units(&stages));
    let brief = valid_brief();
    let (plan, state) = prepare(&engine, &brief);
    let (tx, mut rx) = mpsc::channel(100);

    let outcome = engine
        .run(&plan, &state, Arc::new(brief), &CancelFlag::new(), Some(&tx))
        .await;

    let snapshot = state.snapshot();
    assert_eq!(snapshot.progress, 100);
    assert!(snapshot.error.is_none());
    assert_eq!(
        snapshot.completed_steps,
        vec!["stage-1", "stage-2", "stage-3", "stage-4", "stage-5"]
    );
    assert_eq!(snapshot.run_status, Some(RunStatus::Succeeded));

    let RunOutcome::Succeeded(proposal) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    let markdown = proposal.to_markdown();
    assert!(markdown.starts_with("# Project Proposal: Acme Outdoor"));
    assert!(markdown.find("Section 1 body") < markdown.find("Section 5 body"));

    let events = drain_events(&mut rx);
    assert_event_sequence(&events);
    assert_eq!(completed_stages(&events), snapshot.completed_steps);
    assert!(stages.iter().all(|s| s.calls() == 1));
}

#[tokio::test]
async fn test_third_stage_failure_stops_pipeline() {
    let mut stages = five_stages();
    stages[2] = ScriptedStage::failing("stage-3", "model timed out");
    let engine = engine_with(as_units(&stages));
    let brief = valid_brief();
    let (plan, state) = prepare(&engine, &brief);

    let outcome = engine
        .run(&plan, &state, Arc::new(brief), &CancelFlag::new(), None)
        .await;

    let record = state.record();
    assert_eq!(record.completed_steps, vec!["stage-1", "stage-2"]);
    assert_eq!(record.progress, 40);
    assert_eq!(record.status, RunStatus::Failed);
    assert_eq!(
        record.error.as_deref(),
        Some("stage-3 failed: Execution failed: model timed out")
    );
    assert!(record.result.is_none());
    assert_eq!(outcome, RunOutcome::Failed(record.error.clone().unwrap()));

    assert_eq!(stages[2].calls(), 1);
    assert_eq!(stages[3].calls(), 0);
    assert_eq!(stages[4].calls(), 0);
}

#[tokio::test]
async fn test_first_stage_failure() {
    let stages = vec![
        ScriptedStage::unavailable("stage-1"),
        ScriptedStage::success("stage-2", "never"),
    ];
    let engine = engine_with(as_units(&stages));
    let brief = valid_brief();
    let (plan, state) = prepare(&engine, &brief);

    engine
        .run(&plan, &state, Arc::new(brief), &CancelFlag::new(), None)
        .await;

    let snapshot = state.snapshot();
    assert!(snapshot.completed_steps.is_empty());
    assert_eq!(snapshot.progress, 0);
    assert!(snapshot.error.is_some());
    assert!(snapshot.is_terminal());
}

#[tokio::test]
async fn test_progress_monotonic_and_steps_prefix() {
    let gates: Vec<GatedStage> = (1..=4)
        .map(|i| GatedStage::new(&format!("g{i}"), "ok"))
        .collect();
    let engine = Arc::new(engine_with(
        gates
            .iter()
            .map(|g| Arc::new(g.clone()) as Arc<dyn StageUnit>)
            .collect(),
    ));
    let brief = valid_brief();
    let (plan, state) = prepare(&engine, &brief);
    let handle = state.handle();

    let runner = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            engine
                .run(&plan, &state, Arc::new(brief), &CancelFlag::new(), None)
                .await
        })
    };

    let mut snapshots = Vec::new();
    for gate in &gates {
        gate.wait_entered().await;
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.current_stage, gate.name());
        assert_eq!(snapshot.status, format!("Running {}", gate.name()));
        snapshots.push(snapshot);
        gate.release();
    }

    let outcome = runner.await.unwrap();
    assert!(outcome.is_success());

    let last = handle.snapshot();
    snapshots.push(last.clone());
    assert_non_decreasing(&snapshots);
    assert_eq!(
        snapshots.iter().map(|s| s.progress).collect::<Vec<_>>(),
        vec![0, 25, 50, 75, 100]
    );
    for snapshot in &snapshots {
        assert_is_prefix(&snapshot.completed_steps, &last.completed_steps);
    }
}

#[tokio::test]
async fn test_terminal_run_rejects_transitions() {
    let stages = vec![ScriptedStage::failing("only", "boom")];
    let engine = engine_with(as_units(&stages));
    let brief = valid_brief();
    let (plan, state) = prepare(&engine, &brief);

    engine
        .run(&plan, &state, Arc::new(brief), &CancelFlag::new(), None)
        .await;
    let before = state.snapshot();

    let rejected = [
        state.advance("only", 50, "late"),
        state.fail("second failure"),
        state.complete(Proposal {
            title: "late".to_string(),
            sections: vec![],
        }),
    ];

    for result in rejected {
        assert!(matches!(result, Err(StateError::InvalidTransition { .. })));
    }
    assert_eq!(state.snapshot(), before);
}

#[tokio::test]
async fn test_later_stages_see_earlier_outputs() {
    let recorder = ContextRecorder::new("recorder");
    let engine = engine_with(vec![
        Arc::new(ScriptedStage::success("first", "1")) as Arc<dyn StageUnit>,
        Arc::new(ScriptedStage::success("second", "2")),
        Arc::new(recorder.clone()),
    ]);
    let brief = valid_brief();
    let (plan, state) = prepare(&engine, &brief);

    engine
        .run(&plan, &state, Arc::new(brief), &CancelFlag::new(), None)
        .await;

    assert_eq!(recorder.seen(), vec!["first", "second"]);
}

#[tokio::test]
async fn test_cancel_between_stages() {
    let gate = GatedStage::new("first", "1");
    let second = ScriptedStage::success("second", "2");
    let engine = Arc::new(engine_with(vec![
        Arc::new(gate.clone()) as Arc<dyn StageUnit>,
        Arc::new(second.clone()),
    ]));
    let brief = valid_brief();
    let (plan, state) = prepare(&engine, &brief);
    let handle = state.handle();
    let cancel = CancelFlag::new();

    let runner = {
        let engine = Arc::clone(&engine);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            engine
                .run(&plan, &state, Arc::new(brief), &cancel, None)
                .await
        })
    };

    gate.wait_entered().await;
    cancel.cancel();
    gate.release();

    let outcome = runner.await.unwrap();
    assert_eq!(outcome, RunOutcome::Failed(CANCELLED_MESSAGE.to_string()));

    let record = handle.record();
    assert_eq!(record.completed_steps, vec!["first"]);
    assert_eq!(record.progress, 50);
    assert_eq!(second.calls(), 0);
}

#[tokio::test]
async fn test_builtin_stages_default_template() {
    let engine = PipelineEngine::new(
        StageRegistry::with_builtin(),
        pg_core::config::templates::builtin_templates(),
    )
    .unwrap();
    let brief = valid_brief();
    let (plan, state) = prepare(&engine, &brief);

    let outcome = engine
        .run(&plan, &state, Arc::new(brief), &CancelFlag::new(), None)
        .await;

    let RunOutcome::Succeeded(proposal) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    let titles: Vec<&str> = proposal.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Requirements Analysis",
            "Competitive Research",
            "Architecture Design",
            "Design Mockups",
            "Investment"
        ]
    );

    let markdown = proposal.to_markdown();
    assert!(markdown.contains("* rei.com"));
    assert!(markdown.contains("Estimated delivery complexity: **medium**"));
    assert!(markdown.contains("**$80,000**"));
}

#[tokio::test]
async fn test_analysis_options_skip_stages() {
    let engine = PipelineEngine::new(
        StageRegistry::with_builtin(),
        pg_core::config::templates::builtin_templates(),
    )
    .unwrap();
    let mut brief = valid_brief();
    brief.analysis_options.competitor_analysis = false;
    brief.analysis_options.design_mockups = false;
    let (plan, state) = prepare(&engine, &brief);

    engine
        .run(&plan, &state, Arc::new(brief), &CancelFlag::new(), None)
        .await;

    assert_eq!(
        state.snapshot().completed_steps,
        vec!["requirements-analysis", "architecture-design", "cost-estimation"]
    );
}
