//! Resolution of files declared in task metadata.
//!
//! References take the form `<module>/<mount>/<subpath>` and may point into
//! any module visible from the owning module's environment. A trailing `/`
//! selects every regular file below a directory.

use std::path::{Component, Path, PathBuf};

use serde_json::json;
use tracing::debug;
use walkdir::WalkDir;

use crate::core::types::FileReference;
use crate::error::{TaskError, TaskResult};
use crate::io::modules::{Module, ModuleRegistry};

/// Module subdirectories that task metadata may reference.
pub const MOUNTS: [&str; 3] = ["lib", "files", "tasks"];

/// Resolve `references` (already deduplicated) to files on disk, in order.
pub fn find_extra_files(
    references: &[String],
    owner: &Module,
    registry: &dyn ModuleRegistry,
) -> TaskResult<Vec<FileReference>> {
    let environment = owner.environment_name();
    let mut resolved = Vec::new();
    for reference in references {
        resolved.extend(resolve_reference(reference, environment, registry)?);
    }
    Ok(resolved)
}

fn resolve_reference(
    reference: &str,
    environment: &str,
    registry: &dyn ModuleRegistry,
) -> TaskResult<Vec<FileReference>> {
    let mut parts = reference.splitn(3, '/');
    let module_name = parts.next().unwrap_or_default();
    let mount = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default();

    let target = registry.find(module_name, environment).ok_or_else(|| {
        TaskError::invalid_metadata(format!(
            "could not find module {module_name} containing task file {rest}"
        ))
        .with_details(json!({
            "module": module_name,
            "environment": environment,
            "file": reference,
        }))
    })?;

    if !MOUNTS.contains(&mount) {
        return Err(TaskError::invalid_metadata(format!(
            "files must be saved in module directories that are available via mount points: {}",
            MOUNTS.join(", ")
        ))
        .with_details(json!({ "file": reference, "mount": mount })));
    }

    let literal = format!(
        "{}/{mount}/{rest}",
        target.path.to_string_lossy().trim_end_matches('/')
    );
    let trimmed = literal.trim_end_matches('/');
    if !is_literal_path(Path::new(trimmed)) {
        return Err(TaskError::invalid_metadata(
            "file pathnames cannot include relative paths",
        )
        .with_details(json!({ "file": reference })));
    }

    let path = PathBuf::from(trimmed);
    if !path.exists() {
        return Err(TaskError::invalid_file(format!(
            "could not find {literal} on disk"
        ))
        .with_details(json!({ "file": reference, "path": literal })));
    }

    let wants_directory = reference.ends_with('/');
    if path.is_dir() {
        if !wants_directory {
            return Err(TaskError::invalid_metadata(format!(
                "directories specified in task metadata must include a trailing slash: {reference}"
            ))
            .with_details(json!({ "file": reference })));
        }
        debug!(reference, path = %path.display(), "expanding task file directory");
        return directory_files(&path, &target);
    }

    if wants_directory {
        return Err(TaskError::invalid_metadata(format!(
            "files specified in task metadata cannot include a trailing slash: {reference}"
        ))
        .with_details(json!({ "file": reference })));
    }
    Ok(vec![file_reference(path, &target)])
}

/// Every regular file below `dir`, in sorted traversal order.
fn directory_files(dir: &Path, module: &Module) -> TaskResult<Vec<FileReference>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            TaskError::invalid_file(format!("could not list {}: {err}", dir.display()))
        })?;
        if entry.path().is_file() {
            files.push(file_reference(entry.into_path(), module));
        }
    }
    Ok(files)
}

/// Logical name is the module name followed by the path below the module root.
fn file_reference(path: PathBuf, module: &Module) -> FileReference {
    let mut name = module.name.clone();
    let relative = path.strip_prefix(&module.path).unwrap_or(&path);
    for component in relative.components() {
        if let Component::Normal(part) = component {
            name.push('/');
            name.push_str(&part.to_string_lossy());
        }
    }
    FileReference { name, path }
}

/// True if `path` is absolute and already in lexically normal form.
fn is_literal_path(path: &Path) -> bool {
    path.is_absolute() && normalize_lexically(path).as_os_str() == path.as_os_str()
}

/// Collapse `.`, `..`, and repeated separators without touching the filesystem.
pub(crate) fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
