//! Error types for pipeline setup.

use thiserror::Error;

/// Problems found while turning templates into executable plans.
///
/// These surface before a run exists; stage failures during a run are
/// recorded on the run itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Template '{template}' references unknown stage '{stage}'")]
    UnknownStage { template: String, stage: String },

    #[error("Template '{template}' lists stage '{stage}' more than once")]
    DuplicateStage { template: String, stage: String },

    #[error("Template '{0}' has no stages to run")]
    EmptyPipeline(String),
}
