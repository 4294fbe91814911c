//! External-service capability traits and their record types.
//!
//! `CalendarSource` and `TaskStore` are the seams between the reconcile
//! engine and the real services; the CLI provides HTTP-backed
//! implementations and the tests provide in-memory ones.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CaltaskResult;
use crate::event::RawEvent;

/// A project in the task tracker. Exactly one, matched by name, is the sync
/// target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

/// A to-do item in the task tracker.
///
/// `(content, date_string)` mirrors the event idempotence key
/// `(title, start_label)`; this system only ever creates tasks, never
/// mutates or deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub content: String,
    pub date_string: String,
}

/// A note attached to a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub item_id: String,
    pub content: String,
}

/// Read-only source of upcoming calendar events.
#[async_trait]
pub trait CalendarSource {
    /// Fetch all events on the primary calendar whose start falls within
    /// `[window_start, window_end)`, with recurring events expanded into
    /// individual instances, ordered by start time ascending.
    async fn fetch_upcoming(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> CaltaskResult<Vec<RawEvent>>;
}

/// The task tracker, scoped reads plus queued batch writes.
///
/// `create_task`/`create_note` queue writes; nothing takes effect until
/// `commit` flushes the batch. Server-assigned ids only become visible by
/// re-listing after a commit, which is why the reconcile engine re-fetches
/// tasks between its two passes.
#[async_trait]
pub trait TaskStore {
    async fn list_projects(&self) -> CaltaskResult<Vec<Project>>;

    /// Tasks belonging to `project` (filtered on `project_id`).
    async fn list_tasks(&self, project: &Project) -> CaltaskResult<Vec<Task>>;

    /// Notes attached to any of the given tasks.
    async fn list_notes(&self, tasks: &[Task]) -> CaltaskResult<Vec<Note>>;

    /// Queue creation of a task in `project`.
    async fn create_task(
        &self,
        project: &Project,
        content: &str,
        date_string: &str,
    ) -> CaltaskResult<()>;

    /// Queue creation of a note on `task`.
    async fn create_note(&self, task: &Task, content: &str) -> CaltaskResult<()>;

    /// Flush queued writes. Partial application on failure is possible;
    /// recovery is re-running the sync.
    async fn commit(&self) -> CaltaskResult<()>;
}
