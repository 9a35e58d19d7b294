//! Configuration file loader for the `.proposal-kit/` directory.
//!
//! This module loads:
//! - `config.toml`: Global settings
//! - `templates/*.yaml` (or `.yml`): Pipeline templates

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::AppConfig;
use crate::config::templates::builtin_templates;
use pg_protocol::config_models::GlobalConfig;
use pg_protocol::pipeline_models::PipelineTemplate;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Name of the configuration directory under the project root.
pub const CONFIG_DIR: &str = ".proposal-kit";

/// Loads all configuration from the `.proposal-kit/` directory.
///
/// Missing directories and files fall back to defaults: a root without
/// `.proposal-kit/` yields [`AppConfig::default`], which carries the
/// built-in templates.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - Files exist but cannot be read
/// - Files have invalid TOML or YAML syntax
/// - Values are unusable (zero intervals, duplicate or unnamed templates)
///
/// # Example
///
/// ```rust,no_run
/// use pg_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Loaded {} templates", config.templates.len());
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let config_dir = root.join(CONFIG_DIR);

    if !config_dir.exists() {
        debug!(path = %config_dir.display(), "No config directory, using defaults");
        return Ok(AppConfig::default());
    }

    let global = load_global_config(&config_dir)?;
    let files = load_templates(&config_dir)?;

    let mut templates: BTreeMap<String, PipelineTemplate> = builtin_templates()
        .into_iter()
        .map(|t| (t.name.clone(), t))
        .collect();
    for template in files {
        debug!(template = %template.name, "Loaded pipeline template");
        templates.insert(template.name.clone(), template);
    }

    Ok(AppConfig {
        global,
        templates: templates.into_values().collect(),
    })
}

/// Loads global configuration from `config.toml`.
fn load_global_config(config_dir: &Path) -> ConfigResult<GlobalConfig> {
    let config_path = config_dir.join("config.toml");

    if !config_path.exists() {
        return Ok(GlobalConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    let config: GlobalConfig =
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: config_path.clone(),
            source,
        })?;

    let invalid = |reason: &str| ConfigError::InvalidConfig {
        path: config_path.clone(),
        reason: reason.to_string(),
    };
    if config.poller.interval_ms == 0 {
        return Err(invalid("poller.interval_ms must be greater than 0"));
    }
    if config.server.generate_timeout_secs == 0 {
        return Err(invalid("server.generate_timeout_secs must be greater than 0"));
    }
    if config.retention.max_finished_runs == 0 {
        return Err(invalid("retention.max_finished_runs must be greater than 0"));
    }

    Ok(config)
}

/// Loads all pipeline templates from `templates/*.yaml`.
fn load_templates(config_dir: &Path) -> ConfigResult<Vec<PipelineTemplate>> {
    let templates_dir = config_dir.join("templates");

    if !templates_dir.exists() {
        return Ok(Vec::new());
    }

    let mut templates: Vec<PipelineTemplate> = Vec::new();

    for entry in WalkDir::new(&templates_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: templates_dir.clone(),
            source,
        })?;

        let path = entry.path();

        let ext = path.extension().and_then(|s| s.to_str());
        if ext != Some("yaml") && ext != Some("yml") {
            continue;
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let template: PipelineTemplate =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::YamlParse {
                path: path.to_path_buf(),
                source,
            })?;

        if template.name.trim().is_empty() {
            return Err(ConfigError::InvalidConfig {
                path: path.to_path_buf(),
                reason: "template name must not be empty".to_string(),
            });
        }
        if templates.iter().any(|t| t.name == template.name) {
            return Err(ConfigError::InvalidConfig {
                path: path.to_path_buf(),
                reason: format!("template '{}' is defined more than once", template.name),
            });
        }

        templates.push(template);
    }

    Ok(templates)
}
