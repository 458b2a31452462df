use chrono::{DateTime, Utc};

/// Title used when an event has no SUMMARY
pub const DEFAULT_TITLE: &str = "No Title";

/// Calendar event snapshot taken from a single feed fetch
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CalendarEvent {
    /// Calendar UID
    pub id: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub description: Option<String>,
    /// Raw value of the first ATTENDEE property
    pub attendee: Option<String>,
}

impl CalendarEvent {
    /// Create an event with only the required fields
    pub fn new(id: impl Into<String>, title: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start_time,
            description: None,
            attendee: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_attendee(mut self, attendee: impl Into<String>) -> Self {
        self.attendee = Some(attendee.into());
        self
    }
}

/// An event that is due and has a resolved contact address
#[derive(Debug, Clone, PartialEq)]
pub struct NotifiableEvent {
    pub event: CalendarEvent,
    /// Digits-only contact address
    pub contact_address: String,
}
