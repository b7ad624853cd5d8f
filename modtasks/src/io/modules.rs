//! Modules and the lookup capability used to reach them.
//!
//! Resolution never consults global state: callers hand a [`ModuleRegistry`]
//! to discovery and file resolution explicitly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::core::names::is_module_name;
use crate::io::config::TasksConfig;
use crate::io::mounts::normalize_lexically;

/// Environment assumed when a module does not record one.
pub const DEFAULT_ENVIRONMENT: &str = "production";

/// Subdirectory of a module holding its tasks.
pub const TASKS_DIRECTORY: &str = "tasks";

/// A named, directory-rooted unit of content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Module {
    pub name: String,
    pub path: PathBuf,
    pub tasks_directory: PathBuf,
    pub environment: Option<String>,
}

impl Module {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: name.into(),
            tasks_directory: path.join(TASKS_DIRECTORY),
            path,
            environment: None,
        }
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Environment used to look up modules referenced by this one.
    pub fn environment_name(&self) -> &str {
        self.environment.as_deref().unwrap_or(DEFAULT_ENVIRONMENT)
    }
}

/// Resolves a module name within an environment.
pub trait ModuleRegistry: Send + Sync {
    fn find(&self, module_name: &str, environment: &str) -> Option<Arc<Module>>;
}

/// Registry backed by environment directories and shared module paths.
///
/// Module `<name>` in environment `<env>` is the first existing directory of
/// `<environment_path>/<env>/modules/<name>`, then `<base>/<name>` for every
/// entry of `base_module_path`.
#[derive(Debug, Clone)]
pub struct DirectoryRegistry {
    environment_path: Option<PathBuf>,
    base_module_path: Vec<PathBuf>,
}

impl DirectoryRegistry {
    pub fn new(environment_path: Option<PathBuf>, base_module_path: Vec<PathBuf>) -> Self {
        Self {
            environment_path,
            base_module_path,
        }
    }

    pub fn from_config(config: &TasksConfig) -> Self {
        Self::new(
            config.environment_path.clone(),
            config.base_module_path.clone(),
        )
    }

    fn candidates(&self, module_name: &str, environment: &str) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Some(root) = &self.environment_path {
            dirs.push(root.join(environment).join("modules").join(module_name));
        }
        dirs.extend(
            self.base_module_path
                .iter()
                .map(|base| base.join(module_name)),
        );
        dirs
    }
}

impl ModuleRegistry for DirectoryRegistry {
    fn find(&self, module_name: &str, environment: &str) -> Option<Arc<Module>> {
        if !is_module_name(module_name) || !is_environment_name(environment) {
            debug!(module = module_name, environment, "rejecting malformed module lookup");
            return None;
        }
        let dir = self
            .candidates(module_name, environment)
            .into_iter()
            .find(|dir| dir.is_dir())?;
        let path = normalize_lexically(&std::path::absolute(&dir).ok()?);
        debug!(module = module_name, environment, path = %path.display(), "module found");
        Some(Arc::new(
            Module::new(module_name, path).with_environment(environment),
        ))
    }
}

/// Environment names become a single path component.
pub fn is_environment_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && Path::new(name).components().count() == 1
}
