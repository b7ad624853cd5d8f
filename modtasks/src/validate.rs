//! Module-level checks backing `modtasks list` and `modtasks validate`.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use crate::discovery::tasks_in_module;
use crate::error::{ErrorKind, TaskError, TaskResult};
use crate::io::modules::{Module, ModuleRegistry};
use crate::task::Task;

/// Result of checking one task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCheck {
    pub name: String,
    pub outcome: Result<(), TaskError>,
}

/// Outcome of checking every task of a module.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidateOutcome {
    pub module: String,
    pub checks: Vec<TaskCheck>,
}

impl ValidateOutcome {
    pub fn is_valid(&self) -> bool {
        self.checks.iter().all(|check| check.outcome.is_ok())
    }
}

/// Look up `module_name` in `environment`.
pub fn lookup_module(
    registry: &dyn ModuleRegistry,
    module_name: &str,
    environment: &str,
) -> TaskResult<Arc<Module>> {
    registry.find(module_name, environment).ok_or_else(|| {
        TaskError::new(
            ErrorKind::TaskNotFound,
            format!("module {module_name} not found in environment {environment}"),
        )
        .with_details(json!({ "module_name": module_name, "environment": environment }))
    })
}

/// Discover the tasks of `module_name`.
pub fn list_tasks(
    registry: Arc<dyn ModuleRegistry>,
    module_name: &str,
    environment: &str,
) -> TaskResult<Vec<Task>> {
    let module = lookup_module(registry.as_ref(), module_name, environment)?;
    tasks_in_module(module, registry)
}

/// Discover and fully resolve every task of `module_name`.
///
/// Each task is validated and its files resolved; a failing task does not
/// stop the remaining tasks from being checked.
pub fn validate_module(
    registry: Arc<dyn ModuleRegistry>,
    module_name: &str,
    environment: &str,
) -> TaskResult<ValidateOutcome> {
    let tasks = list_tasks(registry, module_name, environment)?;
    let checks = tasks
        .iter()
        .map(|task| {
            let outcome = task.validate().and_then(|()| task.files().map(|_| ()));
            debug!(task = task.name(), ok = outcome.is_ok(), "checked task");
            TaskCheck {
                name: task.name().to_string(),
                outcome,
            }
        })
        .collect::<Vec<_>>();
    info!(module = module_name, tasks = checks.len(), "validated module");
    Ok(ValidateOutcome {
        module: module_name.to_string(),
        checks,
    })
}
