// Import and export of the task collection as tasks.json

use crate::error::{TaskError, TaskResult};
use crate::models::Task;
use fs2::FileExt;
use serde_json::Value;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const EXPORT_FILE_NAME: &str = "tasks.json";

/// Serialize the whole collection in the export format
pub fn export_json(tasks: &[Task]) -> TaskResult<String> {
    serde_json::to_string_pretty(tasks).map_err(|e| TaskError::Storage(e.to_string()))
}

/// Write `tasks.json` into `dir`, returning the file path
pub fn export_to_dir(dir: &Path, tasks: &[Task]) -> TaskResult<PathBuf> {
    let path = dir.join(EXPORT_FILE_NAME);
    let json = export_json(tasks)?;

    let io_err = |e: std::io::Error| TaskError::Storage(format!("Failed to write {}: {}", path.display(), e));

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(&path)
        .map_err(io_err)?;

    // Acquire exclusive lock before truncating and writing
    file.lock_exclusive().map_err(io_err)?;
    file.set_len(0).map_err(io_err)?;
    file.write_all(json.as_bytes()).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;

    info!(file = ?path, count = tasks.len(), "Exported tasks");
    Ok(path)
}

/// Read and validate an import file
pub fn import_from_file(path: &Path) -> TaskResult<Vec<Task>> {
    let raw = fs::read_to_string(path)
        .map_err(|e| TaskError::import_format(format!("cannot read {}: {}", path.display(), e)))?;
    parse_import(&raw)
}

/// Validate an import payload and turn it into tasks
///
/// The whole payload is checked before anything is returned, so a caller
/// that only replaces its store on `Ok` never ends up half-imported.
pub fn parse_import(raw: &str) -> TaskResult<Vec<Task>> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| TaskError::import_format(format!("not valid JSON: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(TaskError::import_format(format!(
                "expected a list of tasks, found {}",
                json_kind(&other)
            )));
        }
    };

    let mut tasks = Vec::with_capacity(items.len());
    let mut seen = HashSet::new();

    for (i, item) in items.into_iter().enumerate() {
        check_shape(i, &item)?;

        let task: Task = serde_json::from_value(item)
            .map_err(|e| TaskError::import_format(format!("task {}: {}", i, e)))?;

        if !seen.insert(task.id) {
            return Err(TaskError::import_format(format!("task {}: duplicate id {}", i, task.id)));
        }
        tasks.push(task);
    }

    info!(count = tasks.len(), "Parsed import payload");
    Ok(tasks)
}

// Presence and type checks serde defaults would otherwise paper over
fn check_shape(i: usize, item: &Value) -> TaskResult<()> {
    let obj = item
        .as_object()
        .ok_or_else(|| TaskError::import_format(format!("task {}: expected an object, found {}", i, json_kind(item))))?;

    match obj.get("title") {
        Some(Value::String(title)) if !title.trim().is_empty() => {}
        Some(Value::String(_)) | None => {
            return Err(TaskError::import_format(format!("task {}: missing title", i)));
        }
        Some(other) => {
            return Err(TaskError::import_format(format!(
                "task {}: title must be a string, found {}",
                i,
                json_kind(other)
            )));
        }
    }

    for field in ["description", "category", "priority"] {
        if let Some(v) = obj.get(field)
            && !v.is_string()
        {
            return Err(TaskError::import_format(format!(
                "task {}: {} must be a string, found {}",
                i,
                field,
                json_kind(v)
            )));
        }
    }

    if let Some(v) = obj.get("completed")
        && !v.is_boolean()
    {
        return Err(TaskError::import_format(format!(
            "task {}: completed must be true or false, found {}",
            i,
            json_kind(v)
        )));
    }

    if let Some(v) = obj.get("dueDate")
        && !(v.is_string() || v.is_null())
    {
        return Err(TaskError::import_format(format!(
            "task {}: dueDate must be a string, found {}",
            i,
            json_kind(v)
        )));
    }

    let unknown: Vec<&String> = obj
        .keys()
        .filter(|k| !matches!(k.as_str(), "id" | "title" | "description" | "priority" | "category" | "dueDate" | "completed"))
        .collect();
    if !unknown.is_empty() {
        warn!(task = i, fields = ?unknown, "Ignoring unknown fields in import");
    }

    Ok(())
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, TaskDraft};
    use crate::store::TaskStore;
    use tempfile::TempDir;

    fn sample_store() -> TaskStore {
        let mut store = TaskStore::new();
        store
            .add(TaskDraft::new("Plan trip").priority(Priority::High).category("travel"))
            .unwrap();
        store.add(TaskDraft::new("Water plants").due_date("2024-07-04")).unwrap();
        store.toggle_complete(1).unwrap();
        store
    }

    fn assert_import_error(raw: &str, needle: &str) {
        match parse_import(raw) {
            Err(TaskError::ImportFormat(msg)) => assert!(msg.contains(needle), "'{}' missing from '{}'", needle, msg),
            other => panic!("expected ImportFormat error, got {:?}", other),
        }
    }

    #[test]
    fn test_export_then_import_reproduces_store() {
        let store = sample_store();
        let json = export_json(store.tasks()).unwrap();

        let mut restored = TaskStore::new();
        restored.replace_all(parse_import(&json).unwrap());
        assert_eq!(restored, store);
    }

    #[test]
    fn test_export_to_dir_writes_tasks_json() {
        let temp = TempDir::new().unwrap();
        let store = sample_store();

        let path = export_to_dir(temp.path(), store.tasks()).unwrap();
        assert_eq!(path.file_name().unwrap(), "tasks.json");

        let imported = import_from_file(&path).unwrap();
        assert_eq!(imported, store.tasks());
    }

    #[test]
    fn test_export_overwrites_previous_file() {
        let temp = TempDir::new().unwrap();
        let store = sample_store();
        export_to_dir(temp.path(), store.tasks()).unwrap();

        let path = export_to_dir(temp.path(), &store.tasks()[..1]).unwrap();
        assert_eq!(import_from_file(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_import_accepts_files_without_ids() {
        let raw = r#"[{"title":"Legacy","description":"old","priority":"medium","category":"misc","dueDate":"","completed":false}]"#;
        let tasks = parse_import(raw).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].due_date, None);
    }

    #[test]
    fn test_import_fills_optional_fields() {
        let tasks = parse_import(r#"[{"title":"Bare"}]"#).unwrap();
        assert_eq!(tasks[0].priority, Priority::Medium);
        assert!(!tasks[0].completed);
        assert_eq!(tasks[0].description, "");
    }

    #[test]
    fn test_import_rejects_malformed_payloads() {
        assert_import_error("{oops", "not valid JSON");
        assert_import_error(r#"{"title":"x"}"#, "expected a list");
        assert_import_error(r#"[42]"#, "task 0: expected an object");
        assert_import_error(r#"[{"title":"ok"},{"description":"no title"}]"#, "task 1: missing title");
        assert_import_error(r#"[{"title":"   "}]"#, "missing title");
        assert_import_error(r#"[{"title":7}]"#, "title must be a string");
        assert_import_error(r#"[{"title":"x","priority":"urgent"}]"#, "task 0");
        assert_import_error(r#"[{"title":"x","completed":"yes"}]"#, "completed must be");
        assert_import_error(r#"[{"title":"x","dueDate":20240101}]"#, "dueDate must be");
    }

    #[test]
    fn test_import_rejects_duplicate_ids() {
        let store = sample_store();
        let mut tasks = store.tasks().to_vec();
        tasks[1].id = tasks[0].id;
        let json = export_json(&tasks).unwrap();

        assert_import_error(&json, "duplicate id");
    }

    #[test]
    fn test_import_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = import_from_file(&temp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, TaskError::ImportFormat(_)));
    }
}
