//! Stages whose timing and inputs tests can control and inspect.

use async_trait::async_trait;
use pg_core::stages::{StageContext, StageError, StageOutput, StageUnit};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, Semaphore};

/// A stage that blocks until the test releases it.
///
/// Lets a test observe the progress state while a run is parked inside a
/// known stage.
#[derive(Clone)]
#[allow(dead_code)]
pub struct GatedStage {
    name: String,
    content: String,
    entered: Arc<Notify>,
    gate: Arc<Semaphore>,
}

#[allow(dead_code)]
impl GatedStage {
    pub fn new(name: &str, content: &str) -> Self {
        Self {
            name: name.to_string(),
            content: content.to_string(),
            entered: Arc::new(Notify::new()),
            gate: Arc::new(Semaphore::new(0)),
        }
    }

    /// Resolves once `execute` has been entered.
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    /// Let one pending `execute` finish.
    pub fn release(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl StageUnit for GatedStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> &str {
        &self.name
    }

    async fn execute(&self, _context: &StageContext) -> Result<StageOutput, StageError> {
        self.entered.notify_one();
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| StageError::ExecutionError("gate closed".to_string()))?;
        permit.forget();
        Ok(StageOutput::new(self.content.clone()))
    }
}

/// A stage that records which earlier stages it could see.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct ContextRecorder {
    name: String,
    seen: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl ContextRecorder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            seen: Arc::default(),
        }
    }

    /// Names of the stages in the context of the last execution.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl StageUnit for ContextRecorder {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> &str {
        "Recorder"
    }

    async fn execute(&self, context: &StageContext) -> Result<StageOutput, StageError> {
        let names: Vec<String> = context.previous.iter().map(|c| c.name.clone()).collect();
        *self.seen.lock().unwrap() = names.clone();
        Ok(StageOutput::new(format!("saw {}", names.join(","))))
    }
}

/// A stage whose unit panics instead of returning an error.
#[derive(Clone)]
#[allow(dead_code)]
pub struct PanickingStage {
    name: String,
}

#[allow(dead_code)]
impl PanickingStage {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl StageUnit for PanickingStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> &str {
        "Panics"
    }

    async fn execute(&self, _context: &StageContext) -> Result<StageOutput, StageError> {
        panic!("{} hit an unreachable branch", self.name);
    }
}
