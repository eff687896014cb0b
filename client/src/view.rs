//! Derivation of what the board shows from the cached tasks.
//!
//! [`derive_view`] is a pure function of the task list, a [`StatusFilter`]
//! and a free-text search term. It is cheap enough to run on every render,
//! so nothing here is cached or incrementally maintained.
//!
//! # Example
//!
//! ```
//! use taskdeck_client::types::{Task, TaskStatus};
//! use taskdeck_client::view::{derive_view, StatusFilter};
//!
//! let tasks: Vec<Task> = serde_json::from_str(r#"[
//!     {"id": "1", "title": "A", "status": "todo"},
//!     {"id": "2", "title": "B", "status": "done"}
//! ]"#).unwrap();
//!
//! let view = derive_view(&tasks, &StatusFilter::Only(TaskStatus::Done), "");
//! assert_eq!(view.filtered.len(), 1);
//! assert_eq!(view.filtered[0].id, "2");
//! assert!(view.grouped.todo.is_empty());
//! assert_eq!(view.grouped.done[0].id, "2");
//! ```

use std::fmt;

use crate::types::{Column, Task, TaskStatus};

/// Status filter applied before grouping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Show every task.
    #[default]
    All,
    /// Show only tasks whose status equals this one exactly.
    Only(TaskStatus),
}

impl StatusFilter {
    /// Parses `all` or one of the three status values.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "all" => Some(StatusFilter::All),
            other => TaskStatus::parse(other).map(StatusFilter::Only),
        }
    }

    /// Cycles `all -> todo -> in-progress -> done -> all`.
    ///
    /// An unrecognised status filter goes back to `all`.
    #[must_use]
    pub fn next(&self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Only(TaskStatus::Todo),
            StatusFilter::Only(TaskStatus::Todo) => StatusFilter::Only(TaskStatus::InProgress),
            StatusFilter::Only(TaskStatus::InProgress) => StatusFilter::Only(TaskStatus::Done),
            StatusFilter::Only(_) => StatusFilter::All,
        }
    }

    /// Returns `true` if `task` passes this filter.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => task.status == *status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => write!(f, "{status}"),
        }
    }
}

/// Filtered tasks split into the three board columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedTasks<'a> {
    pub todo: Vec<&'a Task>,
    pub in_progress: Vec<&'a Task>,
    pub done: Vec<&'a Task>,
}

impl<'a> GroupedTasks<'a> {
    /// Tasks in one column.
    #[must_use]
    pub fn column(&self, column: Column) -> &[&'a Task] {
        match column {
            Column::Todo => &self.todo,
            Column::InProgress => &self.in_progress,
            Column::Done => &self.done,
        }
    }

    fn column_mut(&mut self, column: Column) -> &mut Vec<&'a Task> {
        match column {
            Column::Todo => &mut self.todo,
            Column::InProgress => &mut self.in_progress,
            Column::Done => &mut self.done,
        }
    }
}

/// The projection of the task list currently presented to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState<'a> {
    /// Tasks passing both the status filter and the search, in input order.
    pub filtered: Vec<&'a Task>,

    /// `filtered`, partitioned by column.
    pub grouped: GroupedTasks<'a>,
}

/// Lowercases and trims a search term. An empty result matches everything.
#[must_use]
pub fn normalize_search(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Returns `true` if `task` matches an already normalised search term.
#[must_use]
pub fn matches_search(task: &Task, normalized: &str) -> bool {
    normalized.is_empty()
        || task.title.to_lowercase().contains(normalized)
        || task.description_or_empty().to_lowercase().contains(normalized)
}

/// Computes the filtered and grouped view of `tasks`.
///
/// Filtering is stable: tasks keep their relative input order, both in
/// `filtered` and within each column. Tasks with an unrecognised status are
/// grouped under `todo`.
pub fn derive_view<'a, I>(tasks: I, filter: &StatusFilter, search: &str) -> ViewState<'a>
where
    I: IntoIterator<Item = &'a Task>,
{
    let term = normalize_search(search);

    let filtered: Vec<&Task> = tasks
        .into_iter()
        .filter(|task| filter.matches(task) && matches_search(task, &term))
        .collect();

    let mut grouped = GroupedTasks::default();
    for task in &filtered {
        grouped.column_mut(task.column()).push(task);
    }

    ViewState { filtered, grouped }
}
