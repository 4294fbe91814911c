//! Reconcile engine: decides which tasks and notes to create.
//!
//! No state survives between runs; every invocation rebuilds its picture of
//! the world from the calendar and the task tracker, which makes the whole
//! sync a re-runnable set reconciliation. An event is linked to its task
//! purely by the `(title, start_label)` == `(content, date_string)` key.

use std::collections::HashSet;

use crate::error::{CaltaskError, CaltaskResult};
use crate::event::Event;
use crate::note::format_note;
use crate::store::{Note, Project, Task, TaskStore};

/// Counts from one sync run.
#[derive(Debug, Default, PartialEq)]
pub struct SyncReport {
    pub tasks_created: usize,
    pub notes_created: usize,
    /// Events excluded from task creation because they are all-day.
    pub skipped_all_day: usize,
    /// Raw events dropped during normalization (tallied by the driver).
    pub skipped_malformed: usize,
}

impl SyncReport {
    pub fn has_changes(&self) -> bool {
        self.tasks_created > 0 || self.notes_created > 0
    }
}

/// Resolve the sync target by exact name match.
pub async fn find_project<S: TaskStore + ?Sized>(store: &S, name: &str) -> CaltaskResult<Project> {
    let projects = store.list_projects().await?;

    projects
        .into_iter()
        .find(|p| p.name == name)
        .ok_or_else(|| CaltaskError::ProjectNotFound(name.to_string()))
}

/// Events that need a task created: timed events whose key matches no
/// existing task. Duplicate keys within the batch collapse to the first
/// occurrence, so a pair of same-titled same-time events only ever yields
/// one task.
pub fn plan_tasks<'a>(events: &'a [Event], existing: &[Task]) -> Vec<&'a Event> {
    let existing_keys: HashSet<(&str, &str)> = existing
        .iter()
        .map(|t| (t.content.as_str(), t.date_string.as_str()))
        .collect();

    let mut planned_keys = HashSet::new();

    events
        .iter()
        .filter(|e| !e.is_all_day)
        .filter(|e| !existing_keys.contains(&e.key()))
        .filter(|e| planned_keys.insert(e.key()))
        .collect()
}

/// Notes to attach, as `(task, rendered body)` pairs.
///
/// An event without a matching task is skipped (its creation may have failed
/// transiently; the next run retries). A task that already carries any note
/// is skipped: at most one note per task.
pub fn plan_notes<'a>(events: &[Event], tasks: &'a [Task], notes: &[Note]) -> Vec<(&'a Task, String)> {
    let noted: HashSet<&str> = notes.iter().map(|n| n.item_id.as_str()).collect();
    let mut planned: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();

    for event in events.iter().filter(|e| !e.is_all_day) {
        let Some(task) = tasks
            .iter()
            .find(|t| (t.content.as_str(), t.date_string.as_str()) == event.key())
        else {
            continue;
        };

        if noted.contains(task.id.as_str()) || !planned.insert(task.id.as_str()) {
            continue;
        }

        out.push((task, format_note(event)));
    }

    out
}

/// Drives the two create passes against a `TaskStore`.
pub struct ReconcileEngine<'a, S: TaskStore + ?Sized> {
    store: &'a S,
    project: Project,
    dry_run: bool,
}

impl<'a, S: TaskStore + ?Sized> ReconcileEngine<'a, S> {
    pub fn new(store: &'a S, project: Project, dry_run: bool) -> Self {
        ReconcileEngine {
            store,
            project,
            dry_run,
        }
    }

    /// Run both passes: create missing tasks, commit, then attach notes
    /// against a re-fetched task list and commit again.
    ///
    /// The re-fetch between passes is load-bearing: notes attach by task id,
    /// and ids for tasks created in pass one are server-assigned, so they
    /// only become visible after the first commit.
    pub async fn sync(&self, events: &[Event]) -> CaltaskResult<SyncReport> {
        let mut report = SyncReport {
            skipped_all_day: events.iter().filter(|e| e.is_all_day).count(),
            ..SyncReport::default()
        };

        let existing = self.store.list_tasks(&self.project).await?;
        let to_create = plan_tasks(events, &existing);

        for event in &to_create {
            if self.dry_run {
                println!("Would create task '{}' ({})", event.title, event.start_label);
            } else {
                self.store
                    .create_task(&self.project, &event.title, &event.start_label)
                    .await?;
            }
        }
        if !self.dry_run && !to_create.is_empty() {
            self.store.commit().await?;
        }
        report.tasks_created = to_create.len();

        let mut tasks = self.store.list_tasks(&self.project).await?;
        if self.dry_run {
            // Pass one queued nothing, so stand in for the tasks it would
            // have created; otherwise their notes never show up in the plan
            for (i, event) in to_create.iter().enumerate() {
                tasks.push(Task {
                    id: format!("pending-{}", i),
                    project_id: self.project.id.clone(),
                    content: event.title.clone(),
                    date_string: event.start_label.clone(),
                });
            }
        }
        let notes = self.store.list_notes(&tasks).await?;
        let to_note = plan_notes(events, &tasks, &notes);

        for (task, body) in &to_note {
            if self.dry_run {
                println!("Would attach note to '{}' ({})", task.content, task.date_string);
            } else {
                self.store.create_note(task, body).await?;
            }
        }
        if !self.dry_run && !to_note.is_empty() {
            self.store.commit().await?;
        }
        report.notes_created = to_note.len();

        Ok(report)
    }
}
