use crate::components::calendar_feed::CalendarEvent;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    /// `tel:` URI in an ATTENDEE value
    static ref ATTENDEE_TEL: Regex = Regex::new(r"tel:\+?(\d+)").unwrap();
    /// `tel:` URI whose number is percent-encoded, e.g. `tel:%2B1%20555%20123%204567`
    static ref ENCODED_TEL: Regex =
        Regex::new(r"tel:((?:%[0-9A-Fa-f]{2}|[0-9+().-])+)").unwrap();
    /// At least ten digits, optionally after `+`/`00` and a short country code
    static ref BARE_NUMBER: Regex =
        Regex::new(r"(?:(?:\+|00)(\d{1,3}) )?(?:\+|00)?(\d{10,})").unwrap();
    static ref DIGIT_RUN: Regex = Regex::new(r"\d+").unwrap();
}

/// Resolve the contact address of an event
///
/// Strategies are tried in order and the first hit wins:
/// 1. `tel:` URI in the first ATTENDEE
/// 2. percent-encoded `tel:` URI in the description (or title)
/// 3. bare number of at least ten digits in the description (or title)
pub fn extract_contact(event: &CalendarEvent) -> Option<String> {
    if let Some(number) = event.attendee.as_deref().and_then(from_attendee) {
        debug!("Found contact in ATTENDEE for event {}", event.id);
        return Some(number);
    }

    let text = free_text(event);

    if let Some(number) = from_encoded_tel(text) {
        debug!("Found encoded tel: URI for event {}", event.id);
        return Some(number);
    }

    if let Some(number) = from_bare_number(text) {
        debug!("Found bare number for event {}", event.id);
        return Some(number);
    }

    None
}

/// Description, or the title when the description is missing or empty
fn free_text(event: &CalendarEvent) -> &str {
    match event.description.as_deref() {
        Some(description) if !description.is_empty() => description,
        _ => &event.title,
    }
}

fn from_attendee(attendee: &str) -> Option<String> {
    ATTENDEE_TEL
        .captures(attendee)
        .map(|caps| caps[1].to_string())
}

fn from_encoded_tel(text: &str) -> Option<String> {
    ENCODED_TEL
        .captures_iter(text)
        .map(|caps| caps.get(1).map_or("", |m| m.as_str()))
        .filter(|encoded| encoded.contains('%'))
        .find_map(|encoded| {
            let decoded = urlencoding::decode(encoded).ok()?;
            let digits: String = DIGIT_RUN
                .find_iter(&decoded)
                .map(|m| m.as_str())
                .collect();
            (!digits.is_empty()).then_some(digits)
        })
}

fn from_bare_number(text: &str) -> Option<String> {
    let caps = BARE_NUMBER.captures(text)?;
    let country_code = caps.get(1).map_or("", |m| m.as_str());
    Some(format!("{}{}", country_code, &caps[2]))
}
