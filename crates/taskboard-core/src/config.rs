use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::overdue::{DEFAULT_CACHE_CAPACITY, DEFAULT_RULES, SlaRule};
use crate::validate::ValidationRule;

/// File name looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "taskboard.toml";

/// Environment variable overriding the seed path.
pub const SEED_ENV: &str = "TASKBOARD_SEED";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskboardConfig {
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub overdue: OverdueConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default = "default_seed_path")]
    pub path: PathBuf,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            path: default_seed_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueConfig {
    #[serde(default = "default_sla_rules")]
    pub rules: Vec<SlaRule>,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for OverdueConfig {
    fn default() -> Self {
        Self {
            rules: default_sla_rules(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_validation_rules")]
    pub rules: Vec<ValidationRule>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            rules: default_validation_rules(),
        }
    }
}

fn default_seed_path() -> PathBuf {
    PathBuf::from("data/seed.json")
}

fn default_sla_rules() -> Vec<SlaRule> {
    DEFAULT_RULES.to_vec()
}

const fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_validation_rules() -> Vec<ValidationRule> {
    ValidationRule::ALL.to_vec()
}

fn read_config(path: &Path) -> Result<Option<TaskboardConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<TaskboardConfig>(&content)
        .map(Some)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load `taskboard.toml` from `project_root`, or `None` if absent.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<Option<TaskboardConfig>> {
    read_config(&project_root.join(PROJECT_CONFIG_FILE))
}

/// Load `<config_dir>/taskboard/config.toml`, or `None` if absent.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<Option<TaskboardConfig>> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(None);
    };
    read_config(&config_dir.join("taskboard/config.toml"))
}

/// Resolve the effective configuration.
///
/// The project file wins over the user file, which wins over defaults.
/// The seed path is then overridden by `TASKBOARD_SEED` and finally by
/// `cli_seed`. A relative seed path from a config file is resolved against
/// `project_root`.
///
/// # Errors
///
/// Fails if a config file exists but is malformed.
pub fn resolve_config(project_root: &Path, cli_seed: Option<&Path>) -> Result<TaskboardConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;
    let env_seed = env::var_os(SEED_ENV).map(PathBuf::from);
    Ok(resolve_inner(project, user, env_seed, cli_seed, project_root))
}

fn resolve_inner(
    project: Option<TaskboardConfig>,
    user: Option<TaskboardConfig>,
    env_seed: Option<PathBuf>,
    cli_seed: Option<&Path>,
    project_root: &Path,
) -> TaskboardConfig {
    let mut config = project.or(user).unwrap_or_default();

    if config.seed.path.is_relative() {
        config.seed.path = project_root.join(&config.seed.path);
    }
    if let Some(path) = env_seed {
        tracing::debug!(path = %path.display(), "seed path from {SEED_ENV}");
        config.seed.path = path;
    }
    if let Some(path) = cli_seed {
        config.seed.path = path.to_path_buf();
    }

    config
}
