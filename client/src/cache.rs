//! Client-side cache of the user's tasks.
//!
//! The remote API is the source of truth. The cache holds the last known copy
//! of every task, keyed by identifier, and is reconciled one record at a time
//! from write responses instead of being rebuilt after every change.
//!
//! Iteration order is the order the server listed the tasks in, with newly
//! created tasks appended at the end. Replacing a task keeps its position.

use std::collections::HashMap;

use tracing::trace;

use crate::types::Task;

/// Identifier-keyed task cache with stable ordering.
#[derive(Debug, Clone, Default)]
pub struct TaskCache {
    /// Task records by identifier.
    tasks: HashMap<String, Task>,

    /// Identifiers in display order.
    order: Vec<String>,
}

impl TaskCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole cache with a fresh listing.
    ///
    /// If the listing repeats an identifier, the later record wins and keeps
    /// the position of the first occurrence.
    pub fn replace_all(&mut self, tasks: impl IntoIterator<Item = Task>) {
        self.tasks.clear();
        self.order.clear();
        for task in tasks {
            self.upsert(task);
        }
        trace!(count = self.order.len(), "Task cache replaced");
    }

    /// Inserts a task or replaces the record with the same identifier in place.
    ///
    /// Returns `true` if the task was new.
    pub fn upsert(&mut self, task: Task) -> bool {
        let is_new = !self.tasks.contains_key(&task.id);
        if is_new {
            self.order.push(task.id.clone());
        }
        self.tasks.insert(task.id.clone(), task);
        is_new
    }

    /// Removes a task, returning it if it was cached.
    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let task = self.tasks.remove(id)?;
        self.order.retain(|cached| cached != id);
        Some(task)
    }

    /// Looks up a task by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Returns `true` if a task with this identifier is cached.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    /// Iterates over the cached tasks in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().filter_map(|id| self.tasks.get(id))
    }

    /// Number of cached tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Drops every cached task.
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.order.clear();
    }
}
