//! Configuration loading and management.
//!
//! This module loads `config.toml` and pipeline templates from the
//! `.proposal-kit/` directory and provides the built-in templates.

pub mod error;
pub mod loader;
pub mod models;
pub mod templates;

pub use error::{ConfigError, ConfigResult};
pub use loader::load_config;
pub use models::AppConfig;
