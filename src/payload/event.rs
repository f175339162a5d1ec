//! Calendar event payloads
//!
//! Composes a minimal iCalendar `VEVENT` block (RFC 5545) so calendar apps
//! can import the event straight from a scan.

use serde::{Deserialize, Serialize};

/// Calendar event to embed in a QR code
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Event title (`SUMMARY`)
    pub title: String,
    /// Event location
    pub location: String,
    /// Start timestamp as entered, e.g. `20260215T090000`
    pub start: String,
    /// End timestamp as entered
    pub end: String,
    /// Free-text description
    pub description: String,
}

impl CalendarEvent {
    /// Compose the iCalendar payload string.
    ///
    /// Returns an empty string when the title is empty. Optional fields are
    /// dropped from the block rather than emitted blank.
    pub fn compose(&self) -> String {
        if self.title.is_empty() {
            return String::new();
        }

        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            "BEGIN:VEVENT".to_string(),
            format!("SUMMARY:{}", escape_text(&self.title)),
        ];
        if !self.location.is_empty() {
            lines.push(format!("LOCATION:{}", escape_text(&self.location)));
        }
        if !self.start.is_empty() {
            lines.push(format!("DTSTART:{}", self.start));
        }
        if !self.end.is_empty() {
            lines.push(format!("DTEND:{}", self.end));
        }
        if !self.description.is_empty() {
            lines.push(format!("DESCRIPTION:{}", escape_text(&self.description)));
        }
        lines.push("END:VEVENT".to_string());
        lines.push("END:VCALENDAR".to_string());

        lines.join("\r\n")
    }
}

/// Escape an iCalendar TEXT value per RFC 5545 section 3.3.11.
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_event_block() {
        let event = CalendarEvent {
            title: "Team Standup".to_string(),
            location: "Room 3; East Wing".to_string(),
            start: "20260301T100000".to_string(),
            end: "20260301T101500".to_string(),
            description: "Daily sync,\nbring updates".to_string(),
        };
        let block = event.compose();
        assert!(block.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT"));
        assert!(block.contains("SUMMARY:Team Standup"));
        assert!(block.contains("LOCATION:Room 3\\; East Wing"));
        assert!(block.contains("DTSTART:20260301T100000"));
        assert!(block.contains("DTEND:20260301T101500"));
        assert!(block.contains("DESCRIPTION:Daily sync\\,\\nbring updates"));
        assert!(block.ends_with("END:VEVENT\r\nEND:VCALENDAR"));
    }

    #[test]
    fn test_optional_fields_dropped() {
        let event = CalendarEvent {
            title: "Reminder".to_string(),
            ..Default::default()
        };
        let block = event.compose();
        assert!(!block.contains("LOCATION"));
        assert!(!block.contains("DTSTART"));
        assert!(!block.contains("DESCRIPTION"));
    }

    #[test]
    fn test_empty_title_blocks_composition() {
        let event = CalendarEvent {
            location: "Somewhere".to_string(),
            ..Default::default()
        };
        assert_eq!(event.compose(), "");
    }
}
