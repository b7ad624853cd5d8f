//! Shared value types produced by task resolution.
//!
//! These types are plain data: no I/O, deterministic equality, and serde
//! shapes that form the external contract of `implementations()`/`files()`.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{TaskError, TaskResult};

/// Executable selected to realize a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Implementation {
    /// Executable filename, e.g. `install.sh`.
    pub name: String,
    pub path: PathBuf,
    pub requirements: Vec<String>,
}

/// A file shipped alongside a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReference {
    /// Logical name rooted at the owning module, e.g. `mymod/files/helper.rb`.
    pub name: String,
    pub path: PathBuf,
}

impl From<&Implementation> for FileReference {
    fn from(implementation: &Implementation) -> Self {
        Self {
            name: implementation.name.clone(),
            path: implementation.path.clone(),
        }
    }
}

/// Parsed task metadata document (always a JSON object).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    /// Wrap a parsed JSON document, rejecting anything but an object.
    pub fn from_value(value: Value) -> TaskResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(TaskError::invalid_metadata(format!(
                "task metadata must be a JSON object, got {}",
                json_type(&other)
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn implementations(&self) -> Option<&Value> {
        self.get("implementations")
    }

    /// Top-level `files` entries (empty when absent).
    pub fn files(&self) -> TaskResult<Vec<String>> {
        string_list(self.get("files"), "files")
    }

    /// `files` entries of every declared implementation, flattened in order.
    pub fn implementation_files(&self) -> TaskResult<Vec<String>> {
        let Some(implementations) = self.implementations() else {
            return Ok(Vec::new());
        };
        let entries = implementations.as_array().ok_or_else(|| {
            TaskError::invalid_metadata("task metadata 'implementations' must be an array")
        })?;
        let mut files = Vec::new();
        for entry in entries {
            files.extend(string_list(entry.get("files"), "implementations[].files")?);
        }
        Ok(files)
    }
}

/// Read an optional JSON array of strings.
pub(crate) fn string_list(value: Option<&Value>, field: &str) -> TaskResult<Vec<String>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    let items = value.as_array().ok_or_else(|| {
        TaskError::invalid_metadata(format!("task metadata '{field}' must be an array"))
    })?;
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                TaskError::invalid_metadata(format!(
                    "task metadata '{field}' must only contain strings, got {}",
                    json_type(item)
                ))
            })
        })
        .collect()
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
