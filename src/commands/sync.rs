//! The sync run: fetch events, normalize, reconcile into the task tracker.

use anyhow::{Context, Result};
use caltask_core::reconcile::find_project;
use caltask_core::{CalendarSource, CaltaskError, Event, ReconcileEngine};
use chrono::{Duration, Utc};

use crate::app_config;
use crate::config;
use crate::google::GoogleCalendar;
use crate::session::Session;
use crate::todoist::TodoistStore;

pub async fn run(project_name: &str, days_ahead: i64, dry_run: bool) -> Result<()> {
    let env = config::load()?;
    let creds = app_config::load()?;
    let session = Session::load_valid(&creds).await?;

    let calendar = GoogleCalendar::new(session.access_token().to_string());

    let window_start = Utc::now();
    let window_end = window_start + Duration::days(days_ahead);
    let raw_events = calendar
        .fetch_upcoming(window_start, window_end)
        .await
        .context("Failed to fetch upcoming events")?;

    let mut events = Vec::new();
    let mut skipped_malformed = 0;
    for raw in raw_events {
        match Event::from_raw(raw) {
            Ok(event) => events.push(event),
            // A single malformed record is skipped and surfaced, not coerced
            Err(err @ CaltaskError::MalformedEvent(_)) => {
                skipped_malformed += 1;
                eprintln!("Skipping event: {}", err);
            }
            Err(err) => return Err(err.into()),
        }
    }

    println!(
        "Fetched {} events for the next {} days",
        events.len(),
        days_ahead
    );

    let store = TodoistStore::new(env.todoist_api_key);
    let project = find_project(&store, project_name)
        .await
        .with_context(|| format!("Failed to resolve target project '{}'", project_name))?;

    let engine = ReconcileEngine::new(&store, project.clone(), dry_run);
    let mut report = engine
        .sync(&events)
        .await
        .with_context(|| format!("Sync into project '{}' failed", project.name))?;
    report.skipped_malformed = skipped_malformed;

    if dry_run {
        println!(
            "Dry run: {} tasks and {} notes would be created in '{}'",
            report.tasks_created, report.notes_created, project.name
        );
    } else if report.has_changes() {
        println!(
            "Created {} tasks and {} notes in '{}'",
            report.tasks_created, report.notes_created, project.name
        );
    } else {
        println!("'{}' is already up to date", project.name);
    }

    if report.skipped_all_day > 0 || report.skipped_malformed > 0 {
        println!(
            "Skipped {} all-day and {} malformed events",
            report.skipped_all_day, report.skipped_malformed
        );
    }

    Ok(())
}
