//! # pg-protocol
//!
//! Core protocol definitions and data models for proposal-kit.
//!
//! This crate defines all shared data structures used for:
//! - The client brief submitted to `POST /generate`
//! - Progress snapshots returned by `GET /api/progress`
//! - Response envelopes of the HTTP API
//! - Configuration file parsing (TOML config, YAML pipeline templates)
//! - Engine events for in-process consumers
//!
//! ## Modules
//!
//! - [`brief_models`]: The client brief and its validation
//! - [`run_models`]: Run lifecycle status and progress snapshots
//! - [`proposal_models`]: Assembled proposal document
//! - [`api_models`]: HTTP request/response envelopes
//! - [`pipeline_models`]: Pipeline templates (ordered stage lists)
//! - [`config_models`]: Global configuration from config.toml
//! - [`ipc`]: Events emitted by the pipeline engine
//!
//! ## Design Principles
//!
//! - Minimal dependencies: serde, thiserror, ts-rs, uuid
//! - TypeScript generation: wire types derive `TS` for the web client
//! - Independent compilation: No dependencies on other proposal-kit crates

pub mod api_models;
pub mod brief_models;
pub mod config_models;
pub mod ipc;
pub mod pipeline_models;
pub mod proposal_models;
pub mod run_models;

// Re-export all public types for convenience
pub use api_models::*;
pub use brief_models::*;
pub use config_models::*;
pub use ipc::*;
pub use pipeline_models::*;
pub use proposal_models::*;
pub use run_models::*;
