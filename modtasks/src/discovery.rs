//! Discovery of the tasks shipped in a module's `tasks/` directory.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::core::names::{
    DEFAULT_TASK, TASK_SEPARATOR, is_tasks_executable_filename, is_tasks_filename,
    is_tasks_metadata_filename, qualified_task_name, task_stem,
};
use crate::error::{ErrorKind, TaskError, TaskResult};
use crate::io::modules::{Module, ModuleRegistry};
use crate::task::Task;

/// Build one [`Task`] per distinct task stem found in `module`.
///
/// Tasks are returned sorted by stem. A missing tasks directory yields no tasks.
pub fn tasks_in_module(
    module: Arc<Module>,
    registry: Arc<dyn ModuleRegistry>,
) -> TaskResult<Vec<Task>> {
    let entries = list_task_files(&module)?;
    let executables: Arc<[PathBuf]> = entries
        .iter()
        .filter(|path| is_tasks_executable_filename(path))
        .cloned()
        .collect();

    let mut groups: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for path in entries {
        if let Some(stem) = task_stem(&path) {
            groups.entry(stem.to_string()).or_default().push(path);
        }
    }
    debug!(
        module = %module.name,
        tasks = groups.len(),
        executables = executables.len(),
        "discovered task files"
    );

    groups
        .into_iter()
        .map(|(stem, files)| {
            let metadata_file = files
                .into_iter()
                .find(|path| is_tasks_metadata_filename(path));
            Task::new(
                Arc::clone(&module),
                &stem,
                Arc::clone(&executables),
                metadata_file,
                Arc::clone(&registry),
            )
        })
        .collect()
}

/// Look up `task_name` (`<module>` or `<module>::<task>`) in `environment`.
pub fn find_task(
    registry: Arc<dyn ModuleRegistry>,
    task_name: &str,
    environment: &str,
) -> TaskResult<Task> {
    let (module_name, basename) = task_name
        .split_once(TASK_SEPARATOR)
        .unwrap_or((task_name, DEFAULT_TASK));
    let not_found = || {
        TaskError::new(
            ErrorKind::TaskNotFound,
            format!("task {task_name} not found in module {module_name}"),
        )
        .with_details(json!({ "task_name": task_name, "module_name": module_name }))
    };

    let module = registry.find(module_name, environment).ok_or_else(not_found)?;
    let wanted = qualified_task_name(module_name, basename);
    tasks_in_module(module, registry)?
        .into_iter()
        .find(|task| task.name() == wanted)
        .ok_or_else(not_found)
}

/// Regular files directly under the tasks directory that can belong to a task.
fn list_task_files(module: &Module) -> TaskResult<Vec<PathBuf>> {
    let dir = &module.tasks_directory;
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(err) if matches!(err.kind(), IoErrorKind::NotFound | IoErrorKind::NotADirectory) => {
            debug!(path = %dir.display(), "module has no tasks directory");
            return Ok(Vec::new());
        }
        Err(err) => {
            return Err(TaskError::invalid_file(format!(
                "could not list tasks directory {}: {err}",
                dir.display()
            )));
        }
    };

    let mut files = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|err| {
            TaskError::invalid_file(format!(
                "could not list tasks directory {}: {err}",
                dir.display()
            ))
        })?;
        let path = entry.path();
        if path.is_file() && is_tasks_filename(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StaticRegistry, TempModules};

    fn registry_for(module: &Module) -> Arc<dyn ModuleRegistry> {
        Arc::new(StaticRegistry::new([module.clone()]))
    }

    #[test]
    fn groups_files_by_stem() {
        let modules = TempModules::new();
        let module = modules
            .module("mymod")
            .file("tasks/init.sh", "")
            .file("tasks/install.sh", "")
            .file("tasks/install.json", "{}")
            .file("tasks/restart.rb", "")
            .file("tasks/README.md", "")
            .file("tasks/notes.md", "")
            .file("tasks/site.conf", "")
            .file("tasks/Bad.sh", "")
            .build();
        let registry = registry_for(&module);

        let tasks = tasks_in_module(Arc::new(module.clone()), registry).expect("discover");
        let names: Vec<&str> = tasks.iter().map(Task::name).collect();
        assert_eq!(names, vec!["mymod", "mymod::install", "mymod::restart"]);

        let install = &tasks[1];
        assert_eq!(
            install.metadata_file(),
            Some(module.tasks_directory.join("install.json").as_path())
        );
        assert_eq!(tasks[2].metadata_file(), None);
    }

    #[test]
    fn executables_are_shared_across_tasks() {
        let modules = TempModules::new();
        let module = modules
            .module("mymod")
            .file("tasks/a.sh", "")
            .file("tasks/b.py", "")
            .file("tasks/b.json", "{}")
            .build();
        let tasks =
            tasks_in_module(Arc::new(module.clone()), registry_for(&module)).expect("discover");
        let expected = vec![
            module.tasks_directory.join("a.sh"),
            module.tasks_directory.join("b.py"),
        ];
        for task in &tasks {
            assert_eq!(task.module_executables(), expected.as_slice());
        }
    }

    #[test]
    fn subdirectories_are_ignored() {
        let modules = TempModules::new();
        let module = modules
            .module("mymod")
            .file("tasks/run.sh", "")
            .file("tasks/helpers/util.sh", "")
            .build();
        let tasks =
            tasks_in_module(Arc::new(module.clone()), registry_for(&module)).expect("discover");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name(), "mymod::run");
    }

    #[test]
    fn module_without_tasks_directory_has_no_tasks() {
        let modules = TempModules::new();
        let module = modules.module("empty").file("lib/x.rb", "").build();
        let tasks =
            tasks_in_module(Arc::new(module.clone()), registry_for(&module)).expect("discover");
        assert!(tasks.is_empty());
    }

    #[test]
    fn find_task_locates_named_and_init_tasks() {
        let modules = TempModules::new();
        let module = modules
            .module("mymod")
            .file("tasks/init.sh", "")
            .file("tasks/install.sh", "")
            .build();
        let registry = registry_for(&module);

        let install =
            find_task(Arc::clone(&registry), "mymod::install", "production").expect("install");
        assert_eq!(install.name(), "mymod::install");
        let init = find_task(Arc::clone(&registry), "mymod", "production").expect("init");
        assert_eq!(init.name(), "mymod");
    }

    #[test]
    fn find_task_reports_missing_task() {
        let modules = TempModules::new();
        let module = modules.module("mymod").file("tasks/install.sh", "").build();
        let registry = registry_for(&module);

        let err =
            find_task(Arc::clone(&registry), "mymod::nope", "production").expect_err("missing");
        assert_eq!(err.kind, ErrorKind::TaskNotFound);
        assert_eq!(
            err.details,
            json!({ "task_name": "mymod::nope", "module_name": "mymod" })
        );

        let err = find_task(registry, "ghost::install", "production").expect_err("no module");
        assert_eq!(err.kind, ErrorKind::TaskNotFound);
        assert_eq!(err.details["module_name"], "ghost");
    }
}
