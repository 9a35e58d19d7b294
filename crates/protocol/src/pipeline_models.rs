//! Pipeline template models for `.proposal-kit/templates/*.yaml`.
//!
//! A template names the ordered list of stages a run executes.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Represents a single entry of a template's stage list.
///
/// The enum uses `#[serde(untagged)]` so YAML can list stages as plain
/// strings, or as maps when the section title should be overridden.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(untagged)]
pub enum StageStep {
    /// Run the named stage with its default title.
    Named(String),

    /// Run the named stage under a custom section title.
    Detailed {
        stage: String,
        #[serde(default)]
        title: Option<String>,
    },
}

impl StageStep {
    pub fn stage(&self) -> &str {
        match self {
            StageStep::Named(stage) => stage,
            StageStep::Detailed { stage, .. } => stage,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            StageStep::Named(_) => None,
            StageStep::Detailed { title, .. } => title.as_deref(),
        }
    }
}

/// Defines a pipeline template: a named, ordered list of stages.
///
/// # Example
///
/// ```yaml
/// name: consulting
/// description: Advisory engagement without build work
/// stages:
///   - requirements-analysis
///   - competitive-research
///   - stage: cost-estimation
///     title: Engagement Fees
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "kebab-case")]
pub struct PipelineTemplate {
    /// Unique name, matched against the brief's `template` field.
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Stages in execution order.
    pub stages: Vec<StageStep>,
}

impl PipelineTemplate {
    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.stage().to_string()).collect()
    }
}
