//! iCalendar feed parsing on top of the `icalendar` crate's parser.

use super::models::{CalendarEvent, DEFAULT_TITLE};
use crate::error::{calendar_error, BotResult};
use crate::utils::time::{local_midnight, resolve_local};
use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;
use icalendar::parser::{read_calendar, unfold, Component};
use icalendar::{CalendarDateTime, DatePerhapsTime};
use tracing::{debug, warn};

/// Parse a feed payload into events, preserving feed order
pub fn parse_feed(content: &str) -> BotResult<Vec<CalendarEvent>> {
    if !content.contains("BEGIN:VCALENDAR") {
        return Err(calendar_error("Payload is not iCalendar data"));
    }

    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded)
        .map_err(|e| calendar_error(&format!("Failed to parse calendar: {}", e)))?;

    let mut events = Vec::new();
    for component in calendar.components.iter().filter(|c| c.name == "VEVENT") {
        match parse_event(component) {
            Some(event) => events.push(event),
            None => warn!("Skipping VEVENT without UID or usable DTSTART"),
        }
    }

    debug!("Parsed {} events from feed", events.len());
    Ok(events)
}

fn parse_event(vevent: &Component) -> Option<CalendarEvent> {
    let id = vevent.find_prop("UID")?.val.to_string();
    let title = vevent
        .find_prop("SUMMARY")
        .map(|p| p.val.to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let start = DatePerhapsTime::try_from(vevent.find_prop("DTSTART")?).ok()?;
    let start_time = to_instant(start)?;

    let description = vevent.find_prop("DESCRIPTION").map(|p| p.val.to_string());
    let attendee = vevent.find_prop("ATTENDEE").map(|p| p.val.to_string());

    Some(CalendarEvent {
        id,
        title,
        start_time,
        description,
        attendee,
    })
}

/// Convert a DTSTART value to an absolute instant
fn to_instant(start: DatePerhapsTime) -> Option<DateTime<Utc>> {
    match start {
        DatePerhapsTime::Date(date) => local_midnight(date),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => Some(dt),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
            resolve_local(&Local, &naive)
        }
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            match tzid.parse::<Tz>() {
                Ok(tz) => resolve_local(&tz, &date_time),
                Err(_) => {
                    debug!("Unknown TZID {}, using local time", tzid);
                    resolve_local(&Local, &date_time)
                }
            }
        }
    }
}
