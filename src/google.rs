//! Google Calendar `CalendarSource` over the REST API.

use async_trait::async_trait;
use caltask_core::{CalendarSource, CaltaskError, CaltaskResult, RawEvent};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Deserialize;

const EVENTS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars/primary/events";

/// Large enough to be effectively unbounded for a 7-day window.
const MAX_RESULTS: &str = "2500";

pub struct GoogleCalendar {
    access_token: String,
    http: reqwest::Client,
}

impl GoogleCalendar {
    pub fn new(access_token: String) -> Self {
        GoogleCalendar {
            access_token,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendar {
    async fn fetch_upcoming(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> CaltaskResult<Vec<RawEvent>> {
        let time_min = window_start.to_rfc3339();
        let time_max = window_end.to_rfc3339();

        let response = self
            .http
            .get(EVENTS_URL)
            .bearer_auth(&self.access_token)
            .query(&[
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
                ("maxResults", MAX_RESULTS),
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
            ])
            .send()
            .await
            .map_err(|e| CaltaskError::Transport(format!("Calendar request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CaltaskError::Auth(
                "Calendar rejected the access token. Run `caltask-cli auth` to re-authorize."
                    .to_string(),
            ));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CaltaskError::Transport(format!(
                "Calendar returned {}: {}",
                status, error_text
            )));
        }

        let body: EventsResponse = response
            .json()
            .await
            .map_err(|e| CaltaskError::Transport(format!("Failed to parse event list: {}", e)))?;

        Ok(body.items.into_iter().map(RawEvent::from).collect())
    }
}

#[derive(Debug, Default, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEvent {
    #[serde(default)]
    id: String,
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    #[serde(default)]
    attendees: Vec<GoogleAttendee>,
    start: Option<GoogleEventTime>,
    #[serde(default)]
    html_link: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEventTime {
    date: Option<NaiveDate>,
    date_time: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Default, Deserialize)]
struct GoogleAttendee {
    #[serde(default)]
    email: String,
}

impl From<GoogleEvent> for RawEvent {
    fn from(event: GoogleEvent) -> Self {
        let (start_date, start_date_time) = match event.start {
            Some(start) => (start.date, start.date_time),
            None => (None, None),
        };

        RawEvent {
            id: event.id,
            title: event.summary.unwrap_or_default(),
            description: event.description,
            location: event.location,
            attendees: event
                .attendees
                .into_iter()
                .map(|a| a.email)
                .filter(|email| !email.is_empty())
                .collect(),
            start_date,
            start_date_time,
            link: event.html_link,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_event_maps_to_raw() {
        let json = r#"{
            "id": "abc123",
            "summary": "Standup",
            "htmlLink": "https://www.google.com/calendar/event?eid=abc123",
            "start": { "dateTime": "2024-01-10T09:00:00+01:00" },
            "attendees": [
                { "email": "a@example.com" },
                { "email": "b@example.com" }
            ]
        }"#;

        let event: GoogleEvent = serde_json::from_str(json).unwrap();
        let raw = RawEvent::from(event);

        assert_eq!(raw.id, "abc123");
        assert_eq!(raw.title, "Standup");
        assert!(raw.start_date.is_none());
        assert!(raw.start_date_time.is_some());
        assert_eq!(raw.attendees, vec!["a@example.com", "b@example.com"]);
        assert!(raw.link.contains("eid=abc123"));
    }

    #[test]
    fn all_day_event_maps_date_only() {
        let json = r#"{
            "id": "d1",
            "summary": "Holiday",
            "start": { "date": "2024-01-01" }
        }"#;

        let event: GoogleEvent = serde_json::from_str(json).unwrap();
        let raw = RawEvent::from(event);

        assert_eq!(raw.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert!(raw.start_date_time.is_none());
        assert!(raw.attendees.is_empty());
    }

    #[test]
    fn missing_start_stays_empty_for_normalizer_to_reject() {
        let event: GoogleEvent = serde_json::from_str(r#"{ "id": "x" }"#).unwrap();
        let raw = RawEvent::from(event);

        assert!(raw.start_date.is_none());
        assert!(raw.start_date_time.is_none());
    }
}
