//! Stage registry.
//!
//! The `StageRegistry` is responsible for:
//! - Registering stage implementations by name
//! - Looking up stages while a pipeline plan is resolved
//! - Checking that a template only names known stages

use crate::stages::base::StageUnit;
use crate::stages::builtin;
use pg_protocol::pipeline_models::PipelineTemplate;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps stage names to their implementations.
#[derive(Clone, Default)]
pub struct StageRegistry {
    stages: HashMap<String, Arc<dyn StageUnit>>,
}

impl StageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in stage.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for stage in builtin::all() {
            registry.register(stage);
        }
        registry
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_stage(mut self, stage: impl StageUnit + 'static) -> Self {
        self.register(Arc::new(stage));
        self
    }

    /// Register a stage under its own name.
    ///
    /// Returns the implementation it replaced, if any.
    pub fn register(&mut self, stage: Arc<dyn StageUnit>) -> Option<Arc<dyn StageUnit>> {
        self.stages.insert(stage.name().to_string(), stage)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn StageUnit>> {
        self.stages.get(name).cloned()
    }

    pub fn has_stage(&self, name: &str) -> bool {
        self.stages.contains_key(name)
    }

    /// Registered stage names, sorted.
    pub fn list_stages(&self) -> Vec<String> {
        let mut names: Vec<String> = self.stages.keys().cloned().collect();
        names.sort();
        names
    }

    /// Stage names in `template` that have no implementation.
    pub fn missing_stages(&self, template: &PipelineTemplate) -> Vec<String> {
        template
            .stages
            .iter()
            .map(|step| step.stage())
            .filter(|name| !self.has_stage(name))
            .map(str::to_string)
            .collect()
    }
}

impl std::fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageRegistry")
            .field("stages", &self.list_stages())
            .finish()
    }
}
