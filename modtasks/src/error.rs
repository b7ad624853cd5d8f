//! Structured errors raised while discovering and resolving tasks.
//!
//! Every failure carries a stable [`ErrorKind`] tag plus a JSON `details`
//! payload. Callers present `{message, kind, details}` to end users; none of
//! these failures are transient, so nothing here is retried.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Closed set of failure kinds surfaced by the task pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    InvalidName,
    InvalidFile,
    InvalidMetadata,
    UnreadableMetadata,
    UnparseableMetadata,
    NoImplementation,
    MultipleImplementations,
    MissingImplementation,
    TaskNotFound,
}

impl ErrorKind {
    /// Stable tag used in serialized errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidName => "invalid-name",
            ErrorKind::InvalidFile => "invalid-file",
            ErrorKind::InvalidMetadata => "invalid-metadata",
            ErrorKind::UnreadableMetadata => "unreadable-metadata",
            ErrorKind::UnparseableMetadata => "unparseable-metadata",
            ErrorKind::NoImplementation => "no-implementation",
            ErrorKind::MultipleImplementations => "multiple-implementations",
            ErrorKind::MissingImplementation => "missing-implementation",
            ErrorKind::TaskNotFound => "task-not-found",
        }
    }

    /// Unreadable and unparseable metadata are refinements of invalid metadata.
    pub fn is_invalid_metadata(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidMetadata
                | ErrorKind::UnreadableMetadata
                | ErrorKind::UnparseableMetadata
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by every fallible task operation.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{message}")]
pub struct TaskError {
    pub message: String,
    pub kind: ErrorKind,
    /// Structured context, always a JSON object (empty when there is none).
    pub details: Value,
}

impl TaskError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            details: Value::Object(Map::new()),
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    pub fn invalid_name(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidName, message)
    }

    pub fn invalid_file(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidFile, message)
    }

    pub fn invalid_metadata(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidMetadata, message)
    }
}

pub type TaskResult<T> = std::result::Result<T, TaskError>;
