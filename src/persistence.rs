// Task collection persistence over a key/value store

use crate::error::{TaskError, TaskResult};
use crate::models::Task;
use crate::storage::KeyValueStore;
use std::collections::HashSet;
use tracing::{debug, info, warn};

pub const TASKS_KEY: &str = "tasks";
pub const DARK_MODE_KEY: &str = "darkMode";
/// Where an unparseable tasks blob is moved so later saves cannot overwrite it
pub const BACKUP_KEY: &str = "tasks.bak";

/// What a checked load found under `TASKS_KEY`
#[derive(Debug, Clone, PartialEq)]
pub enum StoredTasks {
    Missing,
    Loaded(Vec<Task>),
    /// The blob did not parse and was moved to `BACKUP_KEY`
    Unparseable,
}

/// Saves and loads the whole task collection as one serialized blob
pub struct Persistence<S: KeyValueStore> {
    storage: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the stored tasks
    ///
    /// Never fails: a missing key, a read error or an unparseable payload all
    /// produce an empty collection.
    pub fn load(&self) -> Vec<Task> {
        let raw = match self.storage.get(TASKS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No stored tasks, starting empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stored tasks, starting empty");
                return Vec::new();
            }
        };

        parse_tasks(&raw).unwrap_or_default()
    }

    /// Load the stored tasks, reporting what a fail-soft load would hide
    ///
    /// A read error is returned so the caller can stop saving over data it
    /// never saw. An unparseable blob is moved to `BACKUP_KEY` first.
    pub fn load_checked(&mut self) -> TaskResult<StoredTasks> {
        let raw = match self.storage.get(TASKS_KEY)? {
            Some(raw) => raw,
            None => {
                debug!("No stored tasks, starting empty");
                return Ok(StoredTasks::Missing);
            }
        };

        match parse_tasks(&raw) {
            Some(tasks) => Ok(StoredTasks::Loaded(tasks)),
            None => {
                self.storage.set(BACKUP_KEY, &raw)?;
                self.storage.remove(TASKS_KEY)?;
                warn!(backup = BACKUP_KEY, "Moved unparseable tasks blob aside");
                Ok(StoredTasks::Unparseable)
            }
        }
    }

    pub fn save(&mut self, tasks: &[Task]) -> TaskResult<()> {
        let json = serde_json::to_string(tasks).map_err(|e| TaskError::Storage(e.to_string()))?;
        self.storage.set(TASKS_KEY, &json)?;
        debug!(count = tasks.len(), "Saved tasks");
        Ok(())
    }

    /// Dark-mode preference; anything but a stored "true" reads as off
    pub fn load_dark_mode(&self) -> bool {
        match self.storage.get(DARK_MODE_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                warn!(error = %e, "Failed to read dark mode preference");
                false
            }
        }
    }

    pub fn save_dark_mode(&mut self, enabled: bool) -> TaskResult<()> {
        self.storage.set(DARK_MODE_KEY, if enabled { "true" } else { "false" })
    }
}

fn parse_tasks(raw: &str) -> Option<Vec<Task>> {
    let mut tasks: Vec<Task> = match serde_json::from_str(raw) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!(error = %e, "Failed to parse stored tasks, starting empty");
            return None;
        }
    };

    dedup_ids(&mut tasks);
    info!(count = tasks.len(), "Loaded tasks from storage");
    Some(tasks)
}

// Stored blobs predate ids or may have been edited by hand; give any repeated
// id a fresh one so selection stays unambiguous
fn dedup_ids(tasks: &mut [Task]) {
    let mut seen = HashSet::new();
    for task in tasks.iter_mut() {
        if !seen.insert(task.id) {
            task.id = crate::models::TaskId::new();
            seen.insert(task.id);
        }
    }
}
