// Selection set for batch operations

use crate::models::TaskId;
use crate::store::TaskStore;
use std::collections::{BTreeSet, HashSet};

/// Tasks marked for a batch operation, tracked by id
///
/// Ids are mapped to store positions only when a batch operation runs, so the
/// selection stays correct while filters, sorts and unrelated deletions
/// reshuffle positions.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    ids: HashSet<TaskId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`; returns whether it is now selected
    pub fn toggle(&mut self, id: TaskId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.ids.contains(&id)
    }

    pub fn select_all(&mut self, store: &TaskStore) {
        self.ids = store.tasks().iter().map(|t| t.id).collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Drop ids that no longer exist in `store`
    pub fn prune(&mut self, store: &TaskStore) {
        self.ids.retain(|id| store.position_of(*id).is_some());
    }

    /// Current store positions of the selected tasks
    pub fn positions(&self, store: &TaskStore) -> BTreeSet<usize> {
        store
            .tasks()
            .iter()
            .enumerate()
            .filter(|(_, t)| self.ids.contains(&t.id))
            .map(|(i, _)| i)
            .collect()
    }
}
