//! Lookup configuration stored in `modtasks.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::io::modules::{DEFAULT_ENVIRONMENT, is_environment_name};

/// Default config file name, relative to the working directory.
pub const CONFIG_FILE: &str = "modtasks.toml";

/// Where modules live on disk (TOML).
///
/// Missing fields default to the conventional system-wide layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TasksConfig {
    /// Directory holding one subdirectory per environment, each with `modules/`.
    pub environment_path: Option<PathBuf>,

    /// Module directories shared by every environment, searched in order.
    pub base_module_path: Vec<PathBuf>,

    /// Environment used when a command does not name one.
    pub default_environment: String,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            environment_path: Some(PathBuf::from("/etc/puppetlabs/code/environments")),
            base_module_path: vec![PathBuf::from("/etc/puppetlabs/code/modules")],
            default_environment: DEFAULT_ENVIRONMENT.to_string(),
        }
    }
}

impl TasksConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_environment.trim().is_empty() {
            return Err(anyhow!("default_environment must not be empty"));
        }
        if !is_environment_name(&self.default_environment) {
            return Err(anyhow!(
                "default_environment must be a single path component (got '{}')",
                self.default_environment
            ));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `TasksConfig::default()`.
pub fn load_config(path: &Path) -> Result<TasksConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config missing, using defaults");
        let cfg = TasksConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: TasksConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &TasksConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, TasksConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("modtasks.toml");
        let cfg = TasksConfig {
            environment_path: Some(temp.path().join("environments")),
            base_module_path: vec![temp.path().join("modules")],
            default_environment: "staging".to_string(),
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("modtasks.toml");
        fs::write(&path, "default_environment = \"dev\"\n").expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded.default_environment, "dev");
        assert_eq!(loaded.base_module_path, TasksConfig::default().base_module_path);
    }

    #[test]
    fn rejects_path_like_environment() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("modtasks.toml");
        fs::write(&path, "default_environment = \"../prod\"\n").expect("write");
        let err = load_config(&path).expect_err("invalid environment");
        assert!(err.to_string().contains("single path component"));
    }
}
