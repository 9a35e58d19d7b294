//! Scripted stage implementation for testing and dry runs.

use crate::stages::base::{StageContext, StageError, StageOutput, StageUnit};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Script {
    Succeed(String),
    Fail(StageError),
}

/// A stage whose outcome is fixed up front.
#[derive(Clone)]
pub struct ScriptedStage {
    name: String,
    title: String,
    script: Script,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedStage {
    pub fn success(name: &str, content: &str) -> Self {
        Self::with_script(name, Script::Succeed(content.to_string()))
    }

    pub fn failing(name: &str, message: &str) -> Self {
        Self::with_script(
            name,
            Script::Fail(StageError::ExecutionError(message.to_string())),
        )
    }

    pub fn unavailable(name: &str) -> Self {
        Self::with_script(
            name,
            Script::Fail(StageError::NotAvailable(format!("{name} is offline"))),
        )
    }

    fn with_script(name: &str, script: Script) -> Self {
        Self {
            name: name.to_string(),
            title: title_case(name),
            script,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sleep before resolving.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// How many times `execute` was entered. Shared between clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// `cost-estimation` -> `Cost Estimation`
fn title_case(name: &str) -> String {
    name.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl StageUnit for ScriptedStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> &str {
        &self.title
    }

    async fn execute(&self, _context: &StageContext) -> Result<StageOutput, StageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.script {
            Script::Succeed(content) => Ok(StageOutput::new(content.clone())),
            Script::Fail(error) => Err(error.clone()),
        }
    }
}
