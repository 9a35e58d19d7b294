//! Stage Unit abstraction and registry.
//!
//! This module provides the `StageUnit` trait, the `StageRegistry` that
//! resolves stage names to implementations, and the built-in stages.

pub mod base;
pub mod builtin;
pub mod registry;
pub mod scripted;

pub use base::{CompletedStage, StageContext, StageError, StageOutput, StageUnit};
pub use registry::StageRegistry;
pub use scripted::ScriptedStage;
