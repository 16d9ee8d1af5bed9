// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use serde_json::Value;
use thiserror::Error;

use crate::Task;

/// File name offered for downloaded exports.
pub const EXPORT_FILE_NAME: &str = "study_planner_tasks.json";

/// Why an import document was rejected.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Expected array of tasks")]
    NotAnArray,

    /// The document was fine but the merged list could not be saved.
    #[error("failed to save imported tasks: {0:#}")]
    Storage(anyhow::Error),
}

/// Pretty-printed JSON of the full task list, in store order.
pub fn export(tasks: &[Task]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(tasks)
}

/// Parses an import document into task records.
///
/// Only the top-level shape is checked. Records are read with
/// [`Task::from_json`], so no single record can fail the import: an element
/// that is not an object becomes an empty task.
pub fn parse_import(document: &str) -> Result<Vec<Task>, ImportError> {
    let value: Value = serde_json::from_str(document).map_err(ImportError::InvalidJson)?;
    let Value::Array(records) = value else {
        return Err(ImportError::NotAnArray);
    };

    let tasks = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            if !record.is_object() {
                tracing::warn!("Import record {} is not an object, using an empty task.", index);
            }
            Task::from_json(record)
        })
        .collect();
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Priority;

    #[test]
    fn test_parse_import_accepts_sparse_records() {
        let tasks = parse_import(r#"[{"id":"x","title":"Imported"}, {}]"#).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, "x");
        assert_eq!(tasks[1].title, "");
        assert_eq!(tasks[1].priority, Priority::Medium);
    }

    #[test]
    fn test_parse_import_rejects_objects() {
        let err = parse_import(r#"{"id":"x","title":"Imported"}"#).unwrap_err();
        assert!(matches!(err, ImportError::NotAnArray));
        assert_eq!(err.to_string(), "Expected array of tasks");
    }

    #[test]
    fn test_parse_import_rejects_garbage() {
        let err = parse_import("this is not json").unwrap_err();
        assert!(matches!(err, ImportError::InvalidJson(_)));
        assert!(err.to_string().starts_with("invalid JSON"));
    }

    #[test]
    fn test_parse_import_reads_non_objects_as_empty_tasks() {
        let tasks = parse_import(r#"[{"id":"ok"}, 42, "text", null]"#).unwrap();
        assert_eq!(tasks.len(), 4);
        assert_eq!(tasks[0].id, "ok");
        for task in &tasks[1..] {
            assert_eq!(*task, Task::default());
        }
    }

    #[test]
    fn test_parse_import_keeps_mistyped_values() {
        let document = r#"[
            {"id":"d","title":"Due with time","due":"2025-03-09T10:00"},
            {"id":"c","title":"Day only","createdAt":"2025-03-01"},
            {"id":"p","title":"Numbered","priority":3},
            {"id":"t","title":42}
        ]"#;
        let tasks = parse_import(document).unwrap();

        assert_eq!(tasks.len(), 4);
        assert_eq!(tasks[0].due, None);
        assert_eq!(tasks[1].created_at, None);
        assert_eq!(tasks[2].priority, Priority::Medium);
        assert_eq!(tasks[3].title, "42");

        let exported: Value = serde_json::from_str(&export(&tasks).unwrap()).unwrap();
        assert_eq!(exported[0]["due"], "2025-03-09T10:00");
        assert_eq!(exported[1]["createdAt"], "2025-03-01");
        assert_eq!(exported[2]["priority"], 3);
        assert_eq!(exported[3]["title"], "42");
    }

    #[test]
    fn test_export_is_pretty_and_complete() {
        let document = r#"[{"id":"a","title":"A","completed":true},{"id":"b","title":"B"}]"#;
        let tasks = parse_import(document).unwrap();

        let exported = export(&tasks).unwrap();

        assert!(exported.contains("\n  {"));
        let back = parse_import(&exported).unwrap();
        assert_eq!(back, tasks);
    }
}
