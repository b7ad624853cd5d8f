//! Loading of task metadata documents (`<task>.json`).

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use jsonschema::{Validator, validator_for};
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::types::Metadata;
use crate::error::{ErrorKind, TaskError, TaskResult};

const METADATA_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../schemas/task_metadata/v1.schema.json"
));

static SCHEMA: LazyLock<Result<Validator, String>> = LazyLock::new(|| {
    let schema: Value = serde_json::from_str(METADATA_SCHEMA).map_err(|err| err.to_string())?;
    validator_for(&schema).map_err(|err| err.to_string())
});

/// Read and parse the metadata file of a task, if it has one.
pub fn read_metadata(path: Option<&Path>) -> TaskResult<Option<Metadata>> {
    let Some(path) = path else {
        return Ok(None);
    };
    debug!(path = %path.display(), "reading task metadata");
    let contents = fs::read(path).map_err(|err| {
        warn!(path = %path.display(), error = %err, "task metadata unreadable");
        TaskError::new(
            ErrorKind::UnreadableMetadata,
            format!("could not read task metadata {}: {err}", path.display()),
        )
    })?;
    let value: Value = serde_json::from_slice(&contents).map_err(|err| {
        TaskError::new(
            ErrorKind::UnparseableMetadata,
            format!("could not parse task metadata {}: {err}", path.display()),
        )
    })?;
    validate_schema(path, &value)?;
    Metadata::from_value(value).map(Some)
}

fn validate_schema(path: &Path, value: &Value) -> TaskResult<()> {
    let compiled = SCHEMA
        .as_ref()
        .map_err(|err| TaskError::invalid_metadata(format!("invalid metadata schema: {err}")))?;
    if compiled.is_valid(value) {
        return Ok(());
    }
    let messages = compiled
        .iter_errors(value)
        .map(|err| err.to_string())
        .collect::<Vec<_>>();
    Err(TaskError::invalid_metadata(format!(
        "task metadata {} failed schema validation: {}",
        path.display(),
        messages.join("; ")
    ))
    .with_details(serde_json::json!({ "errors": messages })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_path_yields_none() {
        assert_eq!(read_metadata(None).expect("no metadata"), None);
    }

    #[test]
    fn parses_object() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("foo.json");
        let document = r#"{
            "description": "Foo",
            "files": ["mymod/lib/a.rb"],
            "parameters": {"name": {"type": "String"}}
        }"#;
        fs::write(&path, document).expect("write");
        let metadata = read_metadata(Some(&path)).expect("read").expect("metadata");
        assert_eq!(metadata.files().expect("files"), vec!["mymod/lib/a.rb"]);
        assert_eq!(
            metadata.get("description"),
            Some(&Value::String("Foo".to_string()))
        );
    }

    #[test]
    fn missing_file_is_unreadable() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = read_metadata(Some(&temp.path().join("gone.json"))).expect_err("missing");
        assert_eq!(err.kind, ErrorKind::UnreadableMetadata);
        assert!(err.kind.is_invalid_metadata());
    }

    #[test]
    fn malformed_json_is_unparseable() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("foo.json");
        fs::write(&path, "{ not json").expect("write");
        let err = read_metadata(Some(&path)).expect_err("malformed");
        assert_eq!(err.kind, ErrorKind::UnparseableMetadata);
    }

    #[test]
    fn invalid_utf8_is_unparseable() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("foo.json");
        fs::write(&path, b"{\"description\": \"\xff\xfe\"}").expect("write");
        let err = read_metadata(Some(&path)).expect_err("invalid utf-8");
        assert_eq!(err.kind, ErrorKind::UnparseableMetadata);
        assert!(err.kind.is_invalid_metadata());
    }

    #[test]
    fn schema_violations_are_invalid_metadata() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("foo.json");
        let document = r#"{"files": "mymod/lib/a.rb", "supports_noop": "yes"}"#;
        fs::write(&path, document).expect("write");
        let err = read_metadata(Some(&path)).expect_err("schema");
        assert_eq!(err.kind, ErrorKind::InvalidMetadata);
        let errors = err.details["errors"].as_array().expect("errors list");
        assert!(errors.len() >= 2);
    }

    #[test]
    fn non_object_document_is_invalid_metadata() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("foo.json");
        fs::write(&path, "[]").expect("write");
        let err = read_metadata(Some(&path)).expect_err("array");
        assert_eq!(err.kind, ErrorKind::InvalidMetadata);
    }
}
