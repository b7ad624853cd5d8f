//! Test-only helpers for building module trees on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::io::modules::{Module, ModuleRegistry};

/// Temporary directory holding one subdirectory per module.
pub struct TempModules {
    dir: TempDir,
}

impl TempModules {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Start a module rooted at `<root>/<name>`.
    pub fn module(&self, name: &str) -> ModuleFixture {
        ModuleFixture::new(self.root(), name)
    }
}

impl Default for TempModules {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder writing module files relative to the module root.
pub struct ModuleFixture {
    name: String,
    path: PathBuf,
    files: Vec<(PathBuf, String)>,
}

impl ModuleFixture {
    pub fn new(root: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: root.join(name),
            files: Vec::new(),
        }
    }

    pub fn file(mut self, relative: &str, contents: &str) -> Self {
        self.files.push((PathBuf::from(relative), contents.to_string()));
        self
    }

    /// Write every file and return the module.
    pub fn build(self) -> Module {
        fs::create_dir_all(&self.path).expect("create module dir");
        for (relative, contents) in &self.files {
            let path = self.path.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("create parent dir");
            }
            fs::write(&path, contents).expect("write module file");
        }
        Module::new(self.name, self.path)
    }
}

/// Registry over a fixed set of modules, matched by name and environment.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    modules: Vec<Arc<Module>>,
}

impl StaticRegistry {
    pub fn new(modules: impl IntoIterator<Item = Module>) -> Self {
        Self {
            modules: modules.into_iter().map(Arc::new).collect(),
        }
    }
}

impl ModuleRegistry for StaticRegistry {
    fn find(&self, module_name: &str, environment: &str) -> Option<Arc<Module>> {
        self.modules
            .iter()
            .find(|module| module.name == module_name && module.environment_name() == environment)
            .cloned()
    }
}
