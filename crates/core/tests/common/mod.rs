//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality across all integration tests:
//! - Test fixtures (briefs, templates, on-disk projects)
//! - Custom assertions
//! - Controllable stages

pub mod assertions;
pub mod fixtures;
pub mod mock_stages;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_stages::*;
