//! Resolved view of a single task for `modtasks show`.

use std::sync::Arc;

use serde::Serialize;

use crate::core::types::{FileReference, Implementation};
use crate::discovery::find_task;
use crate::error::TaskResult;
use crate::io::modules::ModuleRegistry;

/// Everything a task runner needs to ship and invoke a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskReport {
    pub name: String,
    pub module: String,
    pub implementations: Vec<Implementation>,
    pub files: Vec<FileReference>,
}

/// Find `task_name` and resolve its implementations and files.
pub fn show_task(
    registry: Arc<dyn ModuleRegistry>,
    task_name: &str,
    environment: &str,
) -> TaskResult<TaskReport> {
    let task = find_task(registry, task_name, environment)?;
    Ok(TaskReport {
        name: task.name().to_string(),
        module: task.module().name.clone(),
        implementations: task.implementations()?.to_vec(),
        files: task.files()?.to_vec(),
    })
}
