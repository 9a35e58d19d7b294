//! Resolution of a template into the concrete stage list of one run.

use crate::engine::error::EngineError;
use crate::stages::base::StageUnit;
use crate::stages::builtin::{COMPETITIVE_RESEARCH, MOCKUP_GENERATION};
use crate::stages::registry::StageRegistry;
use pg_protocol::brief_models::AnalysisOptions;
use pg_protocol::pipeline_models::PipelineTemplate;
use std::collections::HashSet;
use std::sync::Arc;

/// One stage of a resolved plan.
#[derive(Clone)]
pub struct StageDescriptor {
    pub name: String,
    pub title: String,
    pub unit: Arc<dyn StageUnit>,
}

impl std::fmt::Debug for StageDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageDescriptor")
            .field("name", &self.name)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// Ordered stages for a single run.
#[derive(Debug, Clone)]
pub struct StagePlan {
    pub template: String,
    pub stages: Vec<StageDescriptor>,
}

impl StagePlan {
    pub fn stage_names(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Check that every stage of `template` exists and appears once.
pub fn validate_template(
    registry: &StageRegistry,
    template: &PipelineTemplate,
) -> Result<(), EngineError> {
    if template.stages.is_empty() {
        return Err(EngineError::EmptyPipeline(template.name.clone()));
    }

    let mut seen = HashSet::new();
    for step in &template.stages {
        let stage = step.stage();
        if !registry.has_stage(stage) {
            return Err(EngineError::UnknownStage {
                template: template.name.clone(),
                stage: stage.to_string(),
            });
        }
        if !seen.insert(stage) {
            return Err(EngineError::DuplicateStage {
                template: template.name.clone(),
                stage: stage.to_string(),
            });
        }
    }
    Ok(())
}

/// Whether the brief's analysis options keep `stage` in the plan.
fn enabled(stage: &str, options: &AnalysisOptions) -> bool {
    match stage {
        COMPETITIVE_RESEARCH => options.competitor_analysis,
        MOCKUP_GENERATION => options.design_mockups,
        _ => true,
    }
}

/// Build the plan for one run of `template`.
pub fn resolve(
    registry: &StageRegistry,
    template: &PipelineTemplate,
    options: &AnalysisOptions,
) -> Result<StagePlan, EngineError> {
    validate_template(registry, template)?;

    let mut stages = Vec::with_capacity(template.stages.len());
    for step in &template.stages {
        if !enabled(step.stage(), options) {
            continue;
        }
        let unit = registry
            .get(step.stage())
            .ok_or_else(|| EngineError::UnknownStage {
                template: template.name.clone(),
                stage: step.stage().to_string(),
            })?;
        let title = step.title().unwrap_or_else(|| unit.title()).to_string();
        stages.push(StageDescriptor {
            name: step.stage().to_string(),
            title,
            unit,
        });
    }

    if stages.is_empty() {
        return Err(EngineError::EmptyPipeline(template.name.clone()));
    }

    Ok(StagePlan {
        template: template.name.clone(),
        stages,
    })
}
