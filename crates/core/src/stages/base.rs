//! Base StageUnit trait and supporting types.

use async_trait::async_trait;
use pg_protocol::brief_models::ClientBrief;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Output of one successful stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageOutput {
    /// Markdown body of the section this stage contributes.
    pub content: String,

    /// Structured facts later stages may consume, e.g. a complexity rating.
    pub attributes: BTreeMap<String, Value>,
}

impl StageOutput {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Attach a structured fact.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// A stage that already finished within the current run.
#[derive(Debug, Clone)]
pub struct CompletedStage {
    pub name: String,
    pub title: String,
    pub output: StageOutput,
}

/// Context passed to stages during execution.
///
/// `previous` holds the outputs of every earlier stage of the same run, in
/// execution order.
#[derive(Debug, Clone)]
pub struct StageContext {
    /// Run this execution belongs to.
    pub run_id: Uuid,

    /// The validated client brief.
    pub brief: Arc<ClientBrief>,

    /// Stages that completed before this one.
    pub previous: Vec<CompletedStage>,
}

impl StageContext {
    pub fn new(run_id: Uuid, brief: Arc<ClientBrief>) -> Self {
        Self {
            run_id,
            brief,
            previous: Vec::new(),
        }
    }

    /// Output of an earlier stage, if it ran.
    pub fn output_of(&self, stage: &str) -> Option<&StageOutput> {
        self.previous
            .iter()
            .find(|completed| completed.name == stage)
            .map(|completed| &completed.output)
    }

    /// A structured fact published by an earlier stage.
    pub fn attribute(&self, stage: &str, key: &str) -> Option<&Value> {
        self.output_of(stage)
            .and_then(|output| output.attributes.get(key))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("Stage not available: {0}")]
    NotAvailable(String),
    #[error("Missing input: {0}")]
    MissingInput(String),
    #[error("Execution failed: {0}")]
    ExecutionError(String),
}

/// One opaque content-generation step of the proposal pipeline.
///
/// Implementations own their timeouts: the engine awaits `execute` until it
/// resolves.
#[async_trait]
pub trait StageUnit: Send + Sync {
    /// Unique stage name, e.g. `requirements-analysis`.
    fn name(&self) -> &str;

    /// Default section title.
    fn title(&self) -> &str;

    async fn execute(&self, context: &StageContext) -> Result<StageOutput, StageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoStage {
        available: bool,
    }

    #[async_trait]
    impl StageUnit for EchoStage {
        fn name(&self) -> &str {
            "echo"
        }

        fn title(&self) -> &str {
            "Echo"
        }

        async fn execute(&self, context: &StageContext) -> Result<StageOutput, StageError> {
            if !self.available {
                return Err(StageError::NotAvailable("echo backend offline".to_string()));
            }

            Ok(StageOutput::new(format!("Project: {}", context.brief.project_type))
                .with_attribute("echoed", true))
        }
    }

    fn context() -> StageContext {
        let brief = ClientBrief {
            project_type: "Mobile App".to_string(),
            ..Default::default()
        };
        StageContext::new(Uuid::new_v4(), Arc::new(brief))
    }

    #[tokio::test]
    async fn test_stage_execute_success() {
        let stage = EchoStage { available: true };
        let output = stage.execute(&context()).await.unwrap();

        assert_eq!(output.content, "Project: Mobile App");
        assert_eq!(output.attributes.get("echoed"), Some(&Value::Bool(true)));
    }

    #[tokio::test]
    async fn test_stage_execute_unavailable() {
        let stage = EchoStage { available: false };
        let result = stage.execute(&context()).await;

        assert!(matches!(result, Err(StageError::NotAvailable(_))));
    }

    #[test]
    fn test_context_lookup_of_previous_output() {
        let mut ctx = context();
        assert!(ctx.output_of("requirements-analysis").is_none());

        ctx.previous.push(CompletedStage {
            name: "requirements-analysis".to_string(),
            title: "Requirements Analysis".to_string(),
            output: StageOutput::new("body").with_attribute("complexity", "high"),
        });

        assert_eq!(
            ctx.output_of("requirements-analysis").map(|o| o.content.as_str()),
            Some("body")
        );
        assert_eq!(
            ctx.attribute("requirements-analysis", "complexity"),
            Some(&Value::String("high".to_string()))
        );
        assert!(ctx.attribute("requirements-analysis", "missing").is_none());
    }

    #[test]
    fn test_stage_error_display() {
        let err = StageError::ExecutionError("upstream 503".to_string());
        assert_eq!(err.to_string(), "Execution failed: upstream 503");
    }
}
