//! Requirements analysis: restates the brief as scoped requirements and
//! rates delivery complexity for the stages that follow.

use super::{cleaned, push_bullets, Complexity, REQUIREMENTS_ANALYSIS};
use crate::stages::base::{StageContext, StageError, StageOutput, StageUnit};
use async_trait::async_trait;
use std::fmt::Write;

pub struct RequirementsAnalysis;

#[async_trait]
impl StageUnit for RequirementsAnalysis {
    fn name(&self) -> &str {
        REQUIREMENTS_ANALYSIS
    }

    fn title(&self) -> &str {
        "Requirements Analysis"
    }

    async fn execute(&self, context: &StageContext) -> Result<StageOutput, StageError> {
        let brief = &context.brief;
        let description = brief.description.trim();
        if description.is_empty() {
            return Err(StageError::MissingInput("project description".to_string()));
        }

        let features = cleaned(&brief.features);
        let goals = cleaned(&brief.business_goals);
        let complexity = Complexity::from_feature_count(features.len());

        let mut out = String::new();
        let _ = writeln!(out, "### Project Overview\n\n{description}\n");

        if !goals.is_empty() {
            push_bullets(&mut out, "Business Goals", &goals);
        }

        let _ = writeln!(out, "### Functional Requirements\n");
        if features.is_empty() {
            out.push_str("* Feature set to be refined during discovery\n");
        } else {
            for (i, feature) in features.iter().enumerate() {
                let _ = writeln!(out, "{}. {feature}", i + 1);
            }
        }
        out.push('\n');

        let mut constraints = vec![
            format!("Timeline: {}", brief.timeline.trim()),
            format!("Budget range: {}", brief.budget_range.trim()),
        ];
        if !brief.target_audience.trim().is_empty() {
            constraints.push(format!("Target audience: {}", brief.target_audience.trim()));
        }
        if !brief.location.trim().is_empty() {
            constraints.push(format!("Business location: {}", brief.location.trim()));
        }
        push_bullets(&mut out, "Constraints", &constraints);

        let _ = writeln!(
            out,
            "Estimated delivery complexity: **{}** ({} requested features).",
            complexity.as_str(),
            features.len()
        );

        Ok(StageOutput::new(out)
            .with_attribute("complexity", complexity.as_str())
            .with_attribute("feature_count", features.len()))
    }
}
