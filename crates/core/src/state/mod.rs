//! State management for pipeline runs.
//!
//! This module provides:
//! - The per-run progress state machine (single writer, many readers)
//! - RunRegistry for starting and looking up concurrent runs
//! - ProgressReporter, the read path used by pollers

pub mod manager;
pub mod progress;
pub mod reporter;

pub use manager::{RegistryError, RunRegistry};
pub use progress::{ProgressHandle, ProgressState, RunRecord, StateError};
pub use reporter::ProgressReporter;
