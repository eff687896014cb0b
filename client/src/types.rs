//! Wire types shared between the API client, the task cache and the board.
//!
//! All types serialize to the camelCase JSON used by the remote API. Records
//! that the server owns (tasks, users) also accept Mongo-style `_id` keys,
//! and a task with a missing or malformed status or priority still decodes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::session::SessionToken;

/// Status of a task, which also decides the board column it lands in.
///
/// Unrecognised values coming from the server are kept verbatim in
/// [`TaskStatus::Other`] so they survive a round trip and compare exactly,
/// while [`TaskStatus::column`] files them under `todo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
    /// A status string the client does not recognise.
    Other(String),
}

impl TaskStatus {
    /// Parses one of the three recognised wire values.
    ///
    /// # Example
    ///
    /// ```
    /// use taskdeck_client::types::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::parse("in-progress"), Some(TaskStatus::InProgress));
    /// assert_eq!(TaskStatus::parse("blocked"), None);
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(TaskStatus::Todo),
            "in-progress" => Some(TaskStatus::InProgress),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }

    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
            TaskStatus::Other(raw) => raw,
        }
    }

    /// Returns the board column for this status.
    ///
    /// Unknown statuses are treated as `todo`. This keeps malformed remote
    /// records visible instead of rejecting them, at the cost of hiding the
    /// corruption from the user.
    #[must_use]
    pub fn column(&self) -> Column {
        match self {
            TaskStatus::InProgress => Column::InProgress,
            TaskStatus::Done => Column::Done,
            TaskStatus::Todo | TaskStatus::Other(_) => Column::Todo,
        }
    }
}

impl From<String> for TaskStatus {
    fn from(raw: String) -> Self {
        match TaskStatus::parse(&raw) {
            Some(status) => status,
            None => TaskStatus::Other(raw),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl From<Column> for TaskStatus {
    fn from(column: Column) -> Self {
        match column {
            Column::Todo => TaskStatus::Todo,
            Column::InProgress => TaskStatus::InProgress,
            Column::Done => TaskStatus::Done,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three fixed board columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Todo,
    InProgress,
    Done,
}

impl Column {
    /// All columns in board order.
    pub const ALL: [Column; 3] = [Column::Todo, Column::InProgress, Column::Done];

    /// Human-readable column heading.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Column::Todo => "To Do",
            Column::InProgress => "In Progress",
            Column::Done => "Done",
        }
    }

    /// Zero-based position on the board.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Column::Todo => 0,
            Column::InProgress => 1,
            Column::Done => 2,
        }
    }

    /// Column to the left, if any.
    #[must_use]
    pub fn prev(self) -> Option<Column> {
        match self {
            Column::Todo => None,
            Column::InProgress => Some(Column::Todo),
            Column::Done => Some(Column::InProgress),
        }
    }

    /// Column to the right, if any.
    #[must_use]
    pub fn next(self) -> Option<Column> {
        match self {
            Column::Todo => Some(Column::InProgress),
            Column::InProgress => Some(Column::Done),
            Column::Done => None,
        }
    }
}

/// Task priority. Defaults to [`Priority::Medium`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Parses a priority name, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }

    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A server record carried neither `id` nor `_id`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("record has no `id` or `_id` field")]
pub struct MissingIdError;

/// Picks the record id, preferring `id` over `_id` when both are sent.
fn record_id(id: Option<String>, mongo_id: Option<String>) -> Result<String, MissingIdError> {
    id.or(mongo_id).ok_or(MissingIdError)
}

/// Decodes a status field. Null becomes `todo`; a non-string value is kept
/// as its JSON text in [`TaskStatus::Other`].
fn lenient_status<'de, D>(deserializer: D) -> Result<TaskStatus, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => TaskStatus::Todo,
        Some(Value::String(raw)) => TaskStatus::from(raw),
        Some(other) => TaskStatus::Other(other.to_string()),
    })
}

/// Decodes a priority field. Anything but a known name becomes `medium`.
fn lenient_priority<'de, D>(deserializer: D) -> Result<Priority, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(raw)) => Priority::parse(&raw).unwrap_or_default(),
        _ => Priority::default(),
    })
}

/// A task as returned by the remote API.
///
/// The identifier and timestamps are assigned by the server; the client never
/// fabricates them. `completed` mirrors `status == done` on well-formed
/// records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TaskRecord")]
pub struct Task {
    /// Opaque server-assigned identifier.
    pub id: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: Priority,

    /// Due date as sent by the server (usually `YYYY-MM-DD` or RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,

    #[serde(default)]
    pub completed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Wire shape of a task before the id is settled.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient_status")]
    status: TaskStatus,
    #[serde(default, deserialize_with = "lenient_priority")]
    priority: Priority,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    completed: Option<bool>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<TaskRecord> for Task {
    type Error = MissingIdError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        Ok(Task {
            id: record_id(record.id, record.mongo_id)?,
            title: record.title.unwrap_or_default(),
            description: record.description,
            status: record.status,
            priority: record.priority,
            due_date: record.due_date,
            completed: record.completed.unwrap_or(false),
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl Task {
    /// Returns the board column this task is displayed in.
    #[must_use]
    pub fn column(&self) -> Column {
        self.status.column()
    }

    /// Returns the description, or an empty string when absent.
    #[must_use]
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// An authenticated user, as reported by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserRecord")]
pub struct User {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub email: String,
}

#[derive(Deserialize)]
struct UserRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    email: String,
}

impl TryFrom<UserRecord> for User {
    type Error = MissingIdError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        Ok(User {
            id: record_id(record.id, record.mongo_id)?,
            name: record.name,
            email: record.email,
        })
    }
}

impl User {
    /// Name to greet the user with, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.email,
        }
    }
}

/// Successful response from `/auth/register` and `/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: SessionToken,
    pub user: User,
}

/// Body of `POST /tasks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl NewTask {
    /// Creates a request with only a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Body of `PATCH /tasks/:id`. Only fields that are `Some` are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Patch that moves a task to `status`, keeping `completed` coupled.
    ///
    /// # Example
    ///
    /// ```
    /// use taskdeck_client::types::{TaskPatch, TaskStatus};
    ///
    /// let patch = TaskPatch::status_change(TaskStatus::Done);
    /// assert_eq!(patch.completed, Some(true));
    ///
    /// let patch = TaskPatch::status_change(TaskStatus::InProgress);
    /// assert_eq!(patch.completed, Some(false));
    /// ```
    #[must_use]
    pub fn status_change(status: TaskStatus) -> Self {
        let completed = status == TaskStatus::Done;
        Self {
            status: Some(status),
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Patch that flips the completion flag of `task`.
    ///
    /// Completing moves the task to `done`; un-completing moves it back to
    /// `todo`, regardless of the column it was in before.
    #[must_use]
    pub fn toggle_complete(task: &Task) -> Self {
        if task.completed {
            Self::status_change(TaskStatus::Todo)
        } else {
            Self::status_change(TaskStatus::Done)
        }
    }

    /// Returns `true` when the patch would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
