//! Naming rules for task artifacts found under a module's `tasks/` directory.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Extensions that never denote a task artifact, even with a valid stem.
pub const FORBIDDEN_EXTENSIONS: [&str; 2] = [".conf", ".md"];

/// Extension marking a task metadata document.
pub const METADATA_EXTENSION: &str = ".json";

/// Basename of a module's default task, exposed under the bare module name.
pub const DEFAULT_TASK: &str = "init";

/// Separator between module name and task basename in qualified task names.
pub const TASK_SEPARATOR: &str = "::";

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9_]*$").expect("task name pattern compiles")
});

/// True if `name` is a legal task (or module) name component.
pub fn is_task_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// Modules follow the same naming pattern as task components.
pub fn is_module_name(name: &str) -> bool {
    is_task_name(name)
}

/// True if `path` can be part of a task: valid stem and no forbidden extension.
pub fn is_tasks_filename(path: &Path) -> bool {
    let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
        return false;
    };
    if !is_task_name(stem) {
        return false;
    }
    let full = path.to_string_lossy();
    !FORBIDDEN_EXTENSIONS.iter().any(|ext| full.ends_with(ext))
}

pub fn is_tasks_metadata_filename(path: &Path) -> bool {
    is_tasks_filename(path) && path.to_string_lossy().ends_with(METADATA_EXTENSION)
}

pub fn is_tasks_executable_filename(path: &Path) -> bool {
    is_tasks_filename(path) && !path.to_string_lossy().ends_with(METADATA_EXTENSION)
}

/// Filename with its last extension stripped, as used to group task files.
pub fn task_stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|stem| stem.to_str())
}

/// Basename a qualified task name maps to on disk (`mod::foo` -> `foo`, `mod` -> `init`).
pub fn task_basename(task_name: &str) -> &str {
    match task_name.rsplit_once(TASK_SEPARATOR) {
        Some((_, basename)) => basename,
        None => DEFAULT_TASK,
    }
}

/// Public name of the task `stem` in `module_name`.
pub fn qualified_task_name(module_name: &str, stem: &str) -> String {
    if stem == DEFAULT_TASK {
        module_name.to_string()
    } else {
        format!("{module_name}{TASK_SEPARATOR}{stem}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_name_accepts_lowercase_identifiers() {
        assert!(is_task_name("foo"));
        assert!(is_task_name("foo_bar2"));
        assert!(is_task_name("a"));
    }

    #[test]
    fn task_name_rejects_bad_identifiers() {
        assert!(!is_task_name("Foo"));
        assert!(!is_task_name("2foo"));
        assert!(!is_task_name("foo-bar"));
        assert!(!is_task_name(""));
        assert!(!is_task_name("_foo"));
        assert!(!is_task_name("foo\n"));
    }

    #[test]
    fn forbidden_extensions_rejected_regardless_of_stem() {
        assert!(!is_tasks_filename(Path::new("/mod/tasks/foo.conf")));
        assert!(!is_tasks_filename(Path::new("/mod/tasks/foo.md")));
    }

    #[test]
    fn valid_stems_accepted() {
        assert!(is_tasks_filename(Path::new("/mod/tasks/foo.json")));
        assert!(is_tasks_filename(Path::new("/mod/tasks/foo.sh")));
        assert!(is_tasks_filename(Path::new("/mod/tasks/foo.py")));
        assert!(is_tasks_filename(Path::new("/mod/tasks/foo")));
    }

    #[test]
    fn invalid_stems_rejected() {
        assert!(!is_tasks_filename(Path::new("/mod/tasks/Foo.sh")));
        assert!(!is_tasks_filename(Path::new("/mod/tasks/foo.tar.gz")));
        assert!(!is_tasks_filename(Path::new("/mod/tasks/.hidden")));
        assert!(!is_tasks_filename(Path::new("/mod/tasks/foo-bar.sh")));
    }

    #[test]
    fn metadata_and_executables_partition() {
        assert!(is_tasks_metadata_filename(Path::new("foo.json")));
        assert!(!is_tasks_executable_filename(Path::new("foo.json")));
        assert!(is_tasks_executable_filename(Path::new("foo.rb")));
        assert!(!is_tasks_metadata_filename(Path::new("foo.rb")));
        assert!(!is_tasks_metadata_filename(Path::new("Foo.json")));
    }

    #[test]
    fn basename_defaults_to_init() {
        assert_eq!(task_basename("apache"), "init");
        assert_eq!(task_basename("apache::restart"), "restart");
    }

    #[test]
    fn init_task_takes_module_name() {
        assert_eq!(qualified_task_name("apache", "init"), "apache");
        assert_eq!(qualified_task_name("apache", "restart"), "apache::restart");
    }
}
