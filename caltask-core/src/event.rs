//! Provider-neutral event types and normalization.
//!
//! Providers convert their API responses into `RawEvent`, and
//! `Event::from_raw` turns those into the canonical `Event` value the
//! reconcile engine works with.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CaltaskError, CaltaskResult};

/// Start-time label format for timed events, e.g. "10 Jan 9:00 AM".
///
/// This string doubles as half of the idempotence key, so it must render
/// identically for the same start value on every run.
const TIMED_LABEL_FORMAT: &str = "%-d %b %-I:%M %p";

/// A calendar event as reported by a provider, before normalization.
///
/// Exactly one of `start_date` / `start_date_time` must be present:
/// `start_date` for all-day events, `start_date_time` for timed ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEvent {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Attendee emails, in provider order
    pub attendees: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub start_date_time: Option<DateTime<FixedOffset>>,
    /// URL to the event in the provider's UI
    pub link: String,
}

/// Event start: a bare date (all-day) or a zoned date-time (timed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventStart {
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
}

/// A normalized calendar event.
///
/// Built once per run from the calendar fetch and discarded after
/// reconciliation. `(title, start_label)` is the idempotence key that links
/// an event to its task in the tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub attendees: Vec<String>,
    pub is_all_day: bool,
    pub start: EventStart,
    pub start_label: String,
    pub link: String,
}

impl Event {
    /// Normalize a raw provider event.
    ///
    /// A raw event must carry a date (all-day) or a date-time (timed), never
    /// both and never neither; anything else is `MalformedEvent` rather than
    /// a silent default.
    pub fn from_raw(raw: RawEvent) -> CaltaskResult<Event> {
        let (start, is_all_day) = match (raw.start_date, raw.start_date_time) {
            (Some(date), None) => (EventStart::Date(date), true),
            (None, Some(dt)) => (EventStart::DateTime(dt), false),
            (Some(_), Some(_)) => {
                return Err(CaltaskError::MalformedEvent(format!(
                    "event '{}' has both a date and a date-time start",
                    raw.id
                )));
            }
            (None, None) => {
                return Err(CaltaskError::MalformedEvent(format!(
                    "event '{}' has neither a date nor a date-time start",
                    raw.id
                )));
            }
        };

        let start_label = start_label(&start);

        Ok(Event {
            id: raw.id,
            title: raw.title,
            description: raw.description,
            location: raw.location,
            attendees: raw.attendees,
            is_all_day,
            start,
            start_label,
            link: raw.link,
        })
    }

    /// The idempotence key matching this event to a task.
    pub fn key(&self) -> (&str, &str) {
        (&self.title, &self.start_label)
    }
}

/// Render the display label for an event start.
///
/// All-day events use the ISO date; timed events use a short day/month/time
/// rendering in the event's own offset.
fn start_label(start: &EventStart) -> String {
    match start {
        EventStart::Date(date) => date.format("%Y-%m-%d").to_string(),
        EventStart::DateTime(dt) => dt.format(TIMED_LABEL_FORMAT).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn timed_raw(id: &str, title: &str, rfc3339: &str) -> RawEvent {
        RawEvent {
            id: id.to_string(),
            title: title.to_string(),
            start_date_time: Some(DateTime::parse_from_rfc3339(rfc3339).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn date_only_is_all_day_with_iso_label() {
        let raw = RawEvent {
            id: "e1".into(),
            title: "Holiday".into(),
            start_date: Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            ..Default::default()
        };

        let event = Event::from_raw(raw).unwrap();
        assert!(event.is_all_day);
        assert_eq!(event.start_label, "2024-01-01");
    }

    #[test]
    fn date_time_is_timed_with_short_label() {
        let event = Event::from_raw(timed_raw("e1", "Standup", "2024-01-10T09:00:00+00:00")).unwrap();

        assert!(!event.is_all_day);
        assert_eq!(event.start_label, "10 Jan 9:00 AM");
    }

    #[test]
    fn label_keeps_event_offset() {
        // 18:30 in +09:00 must render as 6:30 PM, not converted to UTC
        let event = Event::from_raw(timed_raw("e1", "Dinner", "2024-03-05T18:30:00+09:00")).unwrap();
        assert_eq!(event.start_label, "5 Mar 6:30 PM");
    }

    #[test]
    fn label_is_stable_across_runs() {
        let dt = chrono::FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 10, 9, 0, 0)
            .unwrap();
        let a = start_label(&EventStart::DateTime(dt));
        let b = start_label(&EventStart::DateTime(dt));
        assert_eq!(a, b);
    }

    #[test]
    fn both_starts_is_malformed() {
        let raw = RawEvent {
            id: "e1".into(),
            start_date: Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            start_date_time: Some(DateTime::parse_from_rfc3339("2024-01-01T10:00:00Z").unwrap()),
            ..Default::default()
        };

        assert!(matches!(
            Event::from_raw(raw),
            Err(CaltaskError::MalformedEvent(_))
        ));
    }

    #[test]
    fn missing_start_is_malformed() {
        let raw = RawEvent {
            id: "e1".into(),
            ..Default::default()
        };

        assert!(matches!(
            Event::from_raw(raw),
            Err(CaltaskError::MalformedEvent(_))
        ));
    }
}
