//! Selection of the executables that implement a task.
//!
//! Implementations are either listed explicitly in metadata, or inferred from
//! the single executable whose stem matches the task basename.

use std::path::{Path, PathBuf};

use serde_json::{Value, json};

use crate::core::names::task_basename;
use crate::core::types::{Implementation, Metadata, json_type, string_list};
use crate::error::{ErrorKind, TaskError, TaskResult};

/// Pick implementations for `task_name` among `executables`.
///
/// `directory` only appears in error messages.
pub fn find_implementations(
    task_name: &str,
    directory: &Path,
    metadata: Option<&Metadata>,
    executables: &[PathBuf],
) -> TaskResult<Vec<Implementation>> {
    match metadata.and_then(Metadata::implementations) {
        Some(declared) => explicit_implementations(task_name, declared, executables),
        None => implicit_implementation(task_name, directory, executables),
    }
}

fn explicit_implementations(
    task_name: &str,
    declared: &Value,
    executables: &[PathBuf],
) -> TaskResult<Vec<Implementation>> {
    let entries = declared.as_array().ok_or_else(|| {
        TaskError::invalid_metadata(format!(
            "task metadata for task {task_name} does not specify implementations as an array"
        ))
    })?;
    if entries.is_empty() {
        return Err(TaskError::invalid_metadata(format!(
            "task metadata for task {task_name} lists no implementations"
        )));
    }

    entries
        .iter()
        .map(|entry| {
            let name = entry.get("name").and_then(Value::as_str).ok_or_else(|| {
                TaskError::invalid_metadata(format!(
                    "task metadata for task {task_name} has an implementation \
                     without a name (got {})",
                    json_type(entry)
                ))
            })?;
            let requirements =
                string_list(entry.get("requirements"), "implementations[].requirements")
                    .map_err(|_| {
                        TaskError::invalid_metadata(format!(
                            "task metadata for task {task_name} does not specify \
                             requirements of {name} as an array of strings"
                        ))
                    })?;
            let path = executables
                .iter()
                .find(|candidate| file_name(candidate) == Some(name))
                .ok_or_else(|| {
                    TaskError::new(
                        ErrorKind::MissingImplementation,
                        format!(
                            "task metadata for task {task_name} specifies missing \
                             implementation {name}"
                        ),
                    )
                    .with_details(json!({ "missing": [name] }))
                })?;
            Ok(Implementation {
                name: name.to_string(),
                path: path.clone(),
                requirements,
            })
        })
        .collect()
}

fn implicit_implementation(
    task_name: &str,
    directory: &Path,
    executables: &[PathBuf],
) -> TaskResult<Vec<Implementation>> {
    let basename = task_basename(task_name);
    let matches: Vec<&PathBuf> = executables
        .iter()
        .filter(|candidate| candidate.file_stem().and_then(|stem| stem.to_str()) == Some(basename))
        .collect();

    match matches.as_slice() {
        [] => Err(TaskError::new(
            ErrorKind::NoImplementation,
            format!(
                "no source besides task metadata was found in directory {} for task {task_name}",
                directory.display()
            ),
        )),
        [only] => Ok(vec![Implementation {
            name: file_name(only).unwrap_or(basename).to_string(),
            path: (*only).clone(),
            requirements: Vec::new(),
        }]),
        _ => Err(TaskError::new(
            ErrorKind::MultipleImplementations,
            format!(
                "multiple executables were found in directory {} for task {task_name}; \
                 define 'implementations' in metadata to differentiate between them",
                directory.display()
            ),
        )),
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}
