//! Configuration models that aggregate all settings.

use crate::config::templates::builtin_templates;
use pg_protocol::config_models::GlobalConfig;
use pg_protocol::pipeline_models::PipelineTemplate;

/// Unified application configuration loaded from `.proposal-kit/`.
///
/// - `config.toml`: Global settings
/// - `templates/*.yaml`: Pipeline templates, merged over the built-in ones
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Global settings from `config.toml`.
    pub global: GlobalConfig,

    /// Every known template, sorted by name. A file named like a built-in
    /// template replaces it.
    pub templates: Vec<PipelineTemplate>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut templates = builtin_templates();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            global: GlobalConfig::default(),
            templates,
        }
    }
}
