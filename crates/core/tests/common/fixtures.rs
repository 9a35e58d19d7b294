//! Test fixtures for creating sample briefs, templates and projects.

use pg_core::engine::{PipelineEngine, StagePlan};
use pg_core::stages::{StageRegistry, StageUnit};
use pg_core::state::ProgressState;
use pg_protocol::brief_models::ClientBrief;
use pg_protocol::pipeline_models::{PipelineTemplate, StageStep};
use std::sync::Arc;
use tempfile::TempDir;

/// A brief that passes validation and exercises every built-in stage.
#[allow(dead_code)]
pub fn valid_brief() -> ClientBrief {
    ClientBrief {
        client_name: "Acme Outdoor".to_string(),
        project_type: "E-commerce Website".to_string(),
        industry: "Retail".to_string(),
        description: "Online store for outdoor gear with rentals".to_string(),
        features: vec![
            "Product catalog".to_string(),
            "Checkout".to_string(),
            "Gear rentals".to_string(),
            "Customer accounts".to_string(),
        ],
        timeline: "4 months".to_string(),
        budget_range: "$60k-$90k".to_string(),
        target_audience: "Weekend hikers".to_string(),
        business_goals: vec!["Double online revenue".to_string()],
        competitors: vec!["rei.com".to_string()],
        ..Default::default()
    }
}

/// A template listing `stages` by name.
#[allow(dead_code)]
pub fn template(name: &str, stages: &[&str]) -> PipelineTemplate {
    PipelineTemplate {
        name: name.to_string(),
        description: format!("Test template {name}"),
        stages: stages
            .iter()
            .map(|s| StageStep::Named(s.to_string()))
            .collect(),
    }
}

/// An engine with one `default` template running `stages` in order.
#[allow(dead_code)]
pub fn engine_with(stages: Vec<Arc<dyn StageUnit>>) -> PipelineEngine {
    let names: Vec<String> = stages.iter().map(|s| s.name().to_string()).collect();
    let mut registry = StageRegistry::new();
    for stage in stages {
        registry.register(stage);
    }
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    PipelineEngine::new(registry, vec![template("default", &names)])
        .expect("test template should be valid")
}

/// Plan and fresh progress state for `brief`.
#[allow(dead_code)]
pub fn prepare(engine: &PipelineEngine, brief: &ClientBrief) -> (StagePlan, ProgressState) {
    let plan = engine.plan(brief).expect("brief should resolve to a plan");
    let state = ProgressState::new(plan.template.clone(), plan.stage_names());
    (plan, state)
}

/// Create a temporary project directory with `.proposal-kit` configuration.
///
/// - `config.toml` with a short poll interval and small retention
/// - `templates/quick-quote.yaml` running requirements and pricing
///
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project() -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let root = temp_dir.path();

    std::fs::create_dir_all(root.join(".proposal-kit/templates"))?;

    let config_toml = r#"
[server]
port = 0
generate_timeout_secs = 5

[poller]
interval_ms = 100

[retention]
max_finished_runs = 2
"#;
    std::fs::write(root.join(".proposal-kit/config.toml"), config_toml)?;

    let template_yaml = r#"
name: quick-quote
description: Requirements and a price
stages:
  - requirements-analysis
  - stage: cost-estimation
    title: Quote
"#;
    std::fs::write(
        root.join(".proposal-kit/templates/quick-quote.yaml"),
        template_yaml,
    )?;

    Ok(temp_dir)
}
