//! The task aggregate: one invocable unit of a module.
//!
//! Metadata, implementations, and files are computed lazily on first access
//! and memoized. Failures are never memoized, so a later call recomputes and
//! reports the error again.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::core::implementations::find_implementations;
use crate::core::names::{is_task_name, qualified_task_name};
use crate::core::types::{FileReference, Implementation, Metadata};
use crate::error::{TaskError, TaskResult};
use crate::io::metadata::read_metadata;
use crate::io::modules::{Module, ModuleRegistry};
use crate::io::mounts::find_extra_files;

pub struct Task {
    name: String,
    module: Arc<Module>,
    metadata_file: Option<PathBuf>,
    module_executables: Arc<[PathBuf]>,
    registry: Arc<dyn ModuleRegistry>,
    metadata: OnceLock<Option<Metadata>>,
    implementations: OnceLock<Vec<Implementation>>,
    files: OnceLock<Vec<FileReference>>,
}

impl Task {
    /// Build the task `task_name` (an unqualified stem such as `install`) of `module`.
    ///
    /// Fails with `invalid-name` when the stem is not a legal task name.
    pub fn new(
        module: Arc<Module>,
        task_name: &str,
        module_executables: Arc<[PathBuf]>,
        metadata_file: Option<PathBuf>,
        registry: Arc<dyn ModuleRegistry>,
    ) -> TaskResult<Self> {
        if !is_task_name(task_name) {
            return Err(TaskError::invalid_name(format!(
                "invalid task name '{task_name}': task names must start with a lowercase \
                 letter and contain only lowercase letters, numbers, and underscores"
            ))
            .with_details(serde_json::json!({
                "task_name": task_name,
                "module_name": module.name,
            })));
        }
        Ok(Self {
            name: qualified_task_name(&module.name, task_name),
            module,
            metadata_file,
            module_executables,
            registry,
            metadata: OnceLock::new(),
            implementations: OnceLock::new(),
            files: OnceLock::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module(&self) -> &Arc<Module> {
        &self.module
    }

    pub fn metadata_file(&self) -> Option<&Path> {
        self.metadata_file.as_deref()
    }

    pub fn module_executables(&self) -> &[PathBuf] {
        &self.module_executables
    }

    pub fn metadata(&self) -> TaskResult<Option<&Metadata>> {
        memoize(&self.metadata, || read_metadata(self.metadata_file()))
            .map(Option::as_ref)
    }

    pub fn implementations(&self) -> TaskResult<&[Implementation]> {
        memoize(&self.implementations, || {
            find_implementations(
                &self.name,
                &self.module.tasks_directory,
                self.metadata()?,
                &self.module_executables,
            )
        })
        .map(Vec::as_slice)
    }

    /// Implementation files first, then files declared in metadata.
    pub fn files(&self) -> TaskResult<&[FileReference]> {
        memoize(&self.files, || self.resolve_files()).map(Vec::as_slice)
    }

    /// Check that the task has usable implementations.
    pub fn validate(&self) -> TaskResult<()> {
        self.implementations().map(|_| ())
    }

    fn resolve_files(&self) -> TaskResult<Vec<FileReference>> {
        let mut files: Vec<FileReference> = self
            .implementations()?
            .iter()
            .map(FileReference::from)
            .collect();
        let Some(metadata) = self.metadata()? else {
            return Ok(files);
        };

        let mut references = metadata.files()?;
        references.extend(metadata.implementation_files()?);
        let mut seen_references = HashSet::new();
        references.retain(|reference| seen_references.insert(reference.clone()));

        let extra = find_extra_files(&references, &self.module, self.registry.as_ref())?;
        debug!(
            task = %self.name,
            declared = references.len(),
            resolved = extra.len(),
            "resolved task files"
        );

        let mut seen_paths: HashSet<PathBuf> = files.iter().map(|file| file.path.clone()).collect();
        files.extend(
            extra
                .into_iter()
                .filter(|file| seen_paths.insert(file.path.clone())),
        );
        Ok(files)
    }
}

fn memoize<'a, T>(
    cell: &'a OnceLock<T>,
    compute: impl FnOnce() -> TaskResult<T>,
) -> TaskResult<&'a T> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = compute()?;
    Ok(cell.get_or_init(|| value))
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.module == other.module
    }
}

impl Eq for Task {}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("module", &self.module.name)
            .field("metadata_file", &self.metadata_file)
            .field("module_executables", &self.module_executables)
            .finish_non_exhaustive()
    }
}
