//! Note body rendering.

use crate::event::Event;

const NONE_PLACEHOLDER: &str = "(none)";

/// Render the descriptive note body for an event's task.
///
/// Shape: link, then attendees, location and description blocks, each
/// introduced by a heading and separated by a blank line.
pub fn format_note(event: &Event) -> String {
    let attendees = if event.attendees.is_empty() {
        NONE_PLACEHOLDER.to_string()
    } else {
        event
            .attendees
            .iter()
            .map(|email| format!("- {}", email))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "{link}\n\n# Attendees\n{attendees}\n\n# Location\n{location}\n\n# Description\n{description}\n",
        link = event.link,
        attendees = attendees,
        location = event.location.as_deref().unwrap_or(NONE_PLACEHOLDER),
        description = event.description.as_deref().unwrap_or(NONE_PLACEHOLDER),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, RawEvent};
    use chrono::DateTime;

    fn event(attendees: Vec<&str>, location: Option<&str>, description: Option<&str>) -> Event {
        Event::from_raw(RawEvent {
            id: "e1".into(),
            title: "Standup".into(),
            description: description.map(String::from),
            location: location.map(String::from),
            attendees: attendees.into_iter().map(String::from).collect(),
            start_date_time: Some(DateTime::parse_from_rfc3339("2024-01-10T09:00:00Z").unwrap()),
            link: "https://calendar.example/event/e1".into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn empty_fields_render_placeholders() {
        let body = format_note(&event(vec![], None, None));

        assert_eq!(
            body,
            "https://calendar.example/event/e1\n\n\
             # Attendees\n(none)\n\n\
             # Location\n(none)\n\n\
             # Description\n(none)\n"
        );
    }

    #[test]
    fn attendees_render_one_line_each_in_order() {
        let body = format_note(&event(
            vec!["a@example.com", "b@example.com"],
            Some("Room 4"),
            Some("Weekly check-in"),
        ));

        assert!(body.contains("# Attendees\n- a@example.com\n- b@example.com\n"));
        assert!(body.contains("# Location\nRoom 4\n"));
        assert!(body.contains("# Description\nWeekly check-in\n"));
    }
}
