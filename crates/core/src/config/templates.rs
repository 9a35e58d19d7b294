//! Pipeline templates available without any configuration files.

use crate::stages::builtin::{
    ARCHITECTURE_DESIGN, COMPETITIVE_RESEARCH, COST_ESTIMATION, MOCKUP_GENERATION,
    REQUIREMENTS_ANALYSIS,
};
use pg_protocol::pipeline_models::{PipelineTemplate, StageStep};

pub const DEFAULT_TEMPLATE: &str = "default";

fn named(stage: &str) -> StageStep {
    StageStep::Named(stage.to_string())
}

fn titled(stage: &str, title: &str) -> StageStep {
    StageStep::Detailed {
        stage: stage.to_string(),
        title: Some(title.to_string()),
    }
}

fn template(name: &str, description: &str, stages: Vec<StageStep>) -> PipelineTemplate {
    PipelineTemplate {
        name: name.to_string(),
        description: description.to_string(),
        stages,
    }
}

/// `default`, `software_development`, `consulting` and `marketing`.
pub fn builtin_templates() -> Vec<PipelineTemplate> {
    vec![
        template(
            DEFAULT_TEMPLATE,
            "Full proposal: requirements, research, architecture, mockups and pricing",
            vec![
                named(REQUIREMENTS_ANALYSIS),
                named(COMPETITIVE_RESEARCH),
                named(ARCHITECTURE_DESIGN),
                named(MOCKUP_GENERATION),
                named(COST_ESTIMATION),
            ],
        ),
        template(
            "software_development",
            "Software build proposal without market research",
            vec![
                named(REQUIREMENTS_ANALYSIS),
                titled(ARCHITECTURE_DESIGN, "Technical Architecture"),
                named(MOCKUP_GENERATION),
                named(COST_ESTIMATION),
            ],
        ),
        template(
            "consulting",
            "Advisory engagement: scope, market context and fees",
            vec![
                named(REQUIREMENTS_ANALYSIS),
                titled(COMPETITIVE_RESEARCH, "Market Assessment"),
                titled(COST_ESTIMATION, "Engagement Fees"),
            ],
        ),
        template(
            "marketing",
            "Campaign proposal with competitor positioning and creative direction",
            vec![
                named(REQUIREMENTS_ANALYSIS),
                named(COMPETITIVE_RESEARCH),
                titled(MOCKUP_GENERATION, "Campaign Creative"),
                named(COST_ESTIMATION),
            ],
        ),
    ]
}
