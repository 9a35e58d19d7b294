//! # pg-core
//!
//! Core pipeline engine and progress tracking for proposal-kit.
//!
//! This crate provides:
//! - The Stage Unit abstraction and the built-in proposal stages
//! - A single-writer, multi-reader progress state per run
//! - The pipeline engine that drives stages sequentially, fail-fast
//! - A registry of runs keyed by id, plus the read-only progress reporter
//! - Configuration loading from the `.proposal-kit/` directory
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and built-in templates
//! - [`stages`]: Stage Unit trait, registry and implementations
//! - [`engine`]: Pipeline execution engine
//! - [`state`]: Progress state, run registry and reporter

pub mod config;
pub mod engine;
pub mod stages;
pub mod state;
