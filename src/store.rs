// In-memory task collection

use crate::error::{TaskError, TaskResult};
use crate::filter::FilterMode;
use crate::models::{Task, TaskDraft, TaskId};
use crate::sort::SortMode;
use crate::view;
use std::collections::BTreeSet;
use tracing::{debug, error};

/// Ordered task collection. Insertion order is creation order.
///
/// Positions are only meaningful until the next mutation; callers that need
/// to remember tasks across mutations hold `TaskId`s instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn position_of(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Look up a task by a prefix of its id
    ///
    /// Fails if the prefix matches no task or more than one.
    pub fn resolve(&self, prefix: &str) -> TaskResult<TaskId> {
        // Exports write ids hyphenated; listings show them without
        let prefix: String = prefix.trim().to_ascii_lowercase().chars().filter(|c| *c != '-').collect();
        if prefix.is_empty() {
            return Err(TaskError::UnknownTask(prefix));
        }

        let mut matches = self.tasks.iter().filter(|t| t.id.to_string().starts_with(&prefix));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task.id),
            _ => Err(TaskError::UnknownTask(prefix)),
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Append a new task built from `draft`
    pub fn add(&mut self, draft: TaskDraft) -> TaskResult<Task> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(TaskError::validation("Task cannot be empty!"));
        }

        let task = Task {
            id: TaskId::new(),
            title: title.to_string(),
            description: draft.description.trim().to_string(),
            priority: draft.priority,
            category: draft.category.trim().to_string(),
            due_date: draft.due_date.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
            completed: false,
        };

        debug!(id = %task.id, title = %task.title, "add: appending task");
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Remove the task at `index`; later tasks shift down by one
    pub fn remove(&mut self, index: usize) -> TaskResult<Task> {
        self.check_index(index)?;
        let task = self.tasks.remove(index);
        debug!(index, id = %task.id, "remove: removed task");
        Ok(task)
    }

    pub fn toggle_complete(&mut self, index: usize) -> TaskResult<bool> {
        self.check_index(index)?;
        let task = &mut self.tasks[index];
        task.completed = !task.completed;
        Ok(task.completed)
    }

    /// Replace the title of the task at `index`
    pub fn edit(&mut self, index: usize, new_title: &str) -> TaskResult<()> {
        self.check_index(index)?;
        let title = new_title.trim();
        if title.is_empty() {
            return Err(TaskError::validation("Task cannot be empty!"));
        }
        self.tasks[index].title = title.to_string();
        Ok(())
    }

    /// Remove every task whose position is in `indices`
    ///
    /// Survivors are collected first and swapped in as a whole, so positions
    /// in `indices` all refer to the collection as it was before the call.
    pub fn batch_remove(&mut self, indices: &BTreeSet<usize>) -> TaskResult<usize> {
        self.check_indices(indices)?;

        let before = self.tasks.len();
        let survivors: Vec<Task> = std::mem::take(&mut self.tasks)
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !indices.contains(i))
            .map(|(_, t)| t)
            .collect();
        self.tasks = survivors;

        let removed = before - self.tasks.len();
        debug!(removed, "batch_remove: done");
        Ok(removed)
    }

    /// Mark every task whose position is in `indices` as completed
    ///
    /// Returns how many tasks changed state.
    pub fn batch_complete(&mut self, indices: &BTreeSet<usize>) -> TaskResult<usize> {
        self.check_indices(indices)?;

        let mut changed = 0;
        for &i in indices {
            let task = &mut self.tasks[i];
            if !task.completed {
                task.completed = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Swap in a whole new collection
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        debug!(old = self.tasks.len(), new = tasks.len(), "replace_all");
        self.tasks = tasks;
    }

    /// Filtered and sorted projection of the store
    pub fn compute_view(&self, filter: FilterMode, sort: SortMode) -> Vec<&Task> {
        view::compute_view(&self.tasks, filter, sort)
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn check_index(&self, index: usize) -> TaskResult<()> {
        if index >= self.tasks.len() {
            error!(index, len = self.tasks.len(), "Task index out of bounds");
            return Err(TaskError::Index {
                index,
                len: self.tasks.len(),
            });
        }
        Ok(())
    }

    fn check_indices(&self, indices: &BTreeSet<usize>) -> TaskResult<()> {
        // BTreeSet iterates in order, so the last element is the largest
        match indices.last() {
            Some(&max) => self.check_index(max),
            None => Ok(()),
        }
    }
}
