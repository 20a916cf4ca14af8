// Session state and command handlers
//
// Each handler mutates the store, persists, and leaves a notification; the
// caller re-renders from `visible()` afterwards.

use crate::dispatch::{ContactMessage, MessageDispatcher};
use crate::error::{TaskError, TaskResult};
use crate::filter::FilterMode;
use crate::models::{Task, TaskDraft, TaskId};
use crate::notify::NotificationCenter;
use crate::persistence::{BACKUP_KEY, Persistence, StoredTasks};
use crate::selection::Selection;
use crate::sort::SortMode;
use crate::storage::KeyValueStore;
use crate::store::TaskStore;
use crate::transfer;
use crate::view;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One user session over a task store and its collaborators
pub struct App<S: KeyValueStore, D: MessageDispatcher> {
    store: TaskStore,
    selection: Selection,
    filter: FilterMode,
    sort: SortMode,
    search: String,
    dark_mode: bool,
    persistence: Persistence<S>,
    dispatcher: D,
    notifications: NotificationCenter,
    in_memory_only: bool,
}

impl<S: KeyValueStore, D: MessageDispatcher> App<S, D> {
    /// Start a session from whatever `storage` holds
    ///
    /// If the stored tasks cannot be read the session starts empty and never
    /// writes, so the unread data is left in place.
    pub fn open(storage: S, dispatcher: D) -> Self {
        let mut persistence = Persistence::new(storage);
        let loaded = persistence.load_checked();
        let dark_mode = persistence.load_dark_mode();

        let mut app = Self {
            store: TaskStore::new(),
            selection: Selection::new(),
            filter: FilterMode::default(),
            sort: SortMode::default(),
            search: String::new(),
            dark_mode,
            persistence,
            dispatcher,
            notifications: NotificationCenter::new(),
            in_memory_only: false,
        };

        match loaded {
            Ok(StoredTasks::Loaded(tasks)) => app.store = TaskStore::from_tasks(tasks),
            Ok(StoredTasks::Missing) => {}
            Ok(StoredTasks::Unparseable) => {
                app.notifications.warning(format!(
                    "Stored tasks could not be parsed; a copy was kept under '{}'.",
                    BACKUP_KEY
                ));
            }
            Err(e) => app.degrade(&e),
        }

        info!(tasks = app.store.len(), dark_mode, in_memory_only = app.in_memory_only, "Session started");
        app
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    /// True once storage has failed; nothing is persisted after that
    pub fn is_in_memory_only(&self) -> bool {
        self.in_memory_only
    }

    /// Rows to render: filtered, sorted, then narrowed by the search term
    pub fn visible(&self) -> Vec<&Task> {
        let rows = self.store.compute_view(self.filter, self.sort);
        view::search(rows, &self.search)
    }

    // ========================================================================
    // Task commands
    // ========================================================================

    pub fn add_task(&mut self, draft: TaskDraft) -> TaskResult<TaskId> {
        let task = match self.store.add(draft) {
            Ok(task) => task,
            Err(e) => return self.fail(e),
        };
        self.commit("Task added!");
        Ok(task.id)
    }

    pub fn delete_task(&mut self, id: TaskId) -> TaskResult<()> {
        let index = self.index_of(id)?;
        if let Err(e) = self.store.remove(index) {
            return self.fail(e);
        }
        self.commit("Task deleted!");
        Ok(())
    }

    /// Flip completion; returns the new state
    pub fn toggle_complete(&mut self, id: TaskId) -> TaskResult<bool> {
        let index = self.index_of(id)?;
        let completed = match self.store.toggle_complete(index) {
            Ok(c) => c,
            Err(e) => return self.fail(e),
        };
        self.commit("Task updated!");
        Ok(completed)
    }

    pub fn edit_task(&mut self, id: TaskId, new_title: &str) -> TaskResult<()> {
        let index = self.index_of(id)?;
        if let Err(e) = self.store.edit(index, new_title) {
            return self.fail(e);
        }
        self.commit("Task edited!");
        Ok(())
    }

    // ========================================================================
    // Selection and batch commands
    // ========================================================================

    /// Flip selection of a task; returns whether it is now selected
    pub fn toggle_select(&mut self, id: TaskId) -> TaskResult<bool> {
        self.index_of(id)?;
        Ok(self.selection.toggle(id))
    }

    pub fn select_all(&mut self) -> usize {
        self.selection.select_all(&self.store);
        self.selection.len()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Delete every selected task; returns how many were removed
    pub fn batch_delete(&mut self) -> TaskResult<usize> {
        let positions = self.selected_positions()?;
        let removed = match self.store.batch_remove(&positions) {
            Ok(n) => n,
            Err(e) => return self.fail(e),
        };
        self.selection.clear();
        self.commit("Selected tasks deleted!");
        Ok(removed)
    }

    /// Complete every selected task; returns how many changed
    pub fn batch_complete(&mut self) -> TaskResult<usize> {
        let positions = self.selected_positions()?;
        let changed = match self.store.batch_complete(&positions) {
            Ok(n) => n,
            Err(e) => return self.fail(e),
        };
        self.selection.clear();
        self.commit("Selected tasks marked complete!");
        Ok(changed)
    }

    // ========================================================================
    // View commands
    // ========================================================================

    pub fn set_filter(&mut self, filter: FilterMode) {
        debug!(%filter, "set_filter");
        self.filter = filter;
    }

    pub fn set_sort(&mut self, sort: SortMode) {
        debug!(%sort, "set_sort");
        self.sort = sort;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Flip the dark-mode preference and store it; returns the new value
    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        if !self.in_memory_only
            && let Err(e) = self.persistence.save_dark_mode(self.dark_mode)
        {
            self.degrade(&e);
        }
        self.dark_mode
    }

    // ========================================================================
    // Import / export / contact
    // ========================================================================

    /// Write `tasks.json` into `dir`
    pub fn export(&mut self, dir: &Path) -> TaskResult<PathBuf> {
        match transfer::export_to_dir(dir, self.store.tasks()) {
            Ok(path) => {
                self.notifications.success(format!("Tasks exported to {}", path.display()));
                Ok(path)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Replace the whole store with the contents of an import file
    ///
    /// A file that fails validation leaves the store exactly as it was.
    pub fn import(&mut self, path: &Path) -> TaskResult<usize> {
        let tasks = match transfer::import_from_file(path) {
            Ok(tasks) => tasks,
            Err(e) => return self.fail(e),
        };

        let count = tasks.len();
        self.store.replace_all(tasks);
        self.selection.clear();
        self.commit("Tasks imported!");
        Ok(count)
    }

    pub fn send_contact(&mut self, message: &ContactMessage) -> TaskResult<()> {
        if let Err(e) = message.validate() {
            return self.fail(e);
        }

        self.notifications.success("Sending message...");
        match self.dispatcher.send(message) {
            Ok(()) => {
                self.notifications.success("Message sent successfully!");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Contact message dispatch failed");
                self.notifications.error("Failed to send message. Try again!");
                Err(e)
            }
        }
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn index_of(&mut self, id: TaskId) -> TaskResult<usize> {
        match self.store.position_of(id) {
            Some(index) => Ok(index),
            None => self.fail(TaskError::UnknownTask(id.to_string())),
        }
    }

    fn selected_positions(&mut self) -> TaskResult<std::collections::BTreeSet<usize>> {
        self.selection.prune(&self.store);
        if self.selection.is_empty() {
            return self.fail(TaskError::validation("No tasks selected!"));
        }
        Ok(self.selection.positions(&self.store))
    }

    /// Persist after a successful mutation and report `message`
    fn commit(&mut self, message: &str) {
        self.selection.prune(&self.store);

        if self.in_memory_only {
            self.notifications.success(message);
            return;
        }

        match self.persistence.save(self.store.tasks()) {
            Ok(()) => {
                self.notifications.success(message);
            }
            Err(e) => {
                self.degrade(&e);
                self.notifications
                    .warning(format!("{} Storage unavailable; changes kept for this session only.", message));
            }
        }
    }

    fn degrade(&mut self, e: &TaskError) {
        warn!(error = %e, "Storage failed, continuing in memory only");
        self.in_memory_only = true;
        self.notifications
            .warning("Storage unavailable; changes kept for this session only.");
    }

    fn fail<T>(&mut self, e: TaskError) -> TaskResult<T> {
        match &e {
            TaskError::Index { .. } => {
                // Already logged where detected
                self.notifications.error("Something went wrong; please reload the list.");
            }
            TaskError::ImportFormat(msg) => {
                self.notifications.error(format!("Import failed: {}", msg));
            }
            _ => {
                self.notifications.error(e.to_string());
            }
        }
        Err(e)
    }
}
