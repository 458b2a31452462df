use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::fmt::Display;

/// Fractional hours from `now` until `start` (negative once started)
pub fn hours_until(start: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (start - now).num_milliseconds() as f64 / 3_600_000.0
}

/// Resolve a wall-clock time in the given zone to an instant
///
/// Ambiguous times (DST fall-back) take the earlier instant; times inside a
/// DST gap yield `None`.
pub fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

/// Start of an all-day event in the local system timezone
pub fn local_midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    resolve_local(&Local, &naive)
}

/// Format an event start for a reminder message in the local system timezone
pub fn format_event_time(start: DateTime<Utc>) -> String {
    format_event_time_in(start, &Local)
}

/// Format an event start in the given timezone
pub fn format_event_time_in<Tz>(start: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    start
        .with_timezone(tz)
        .format("%A, %B %-d, %Y at %-I:%M %p %Z")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_hours_until() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();

        assert_eq!(hours_until(now + Duration::hours(6), now), 6.0);
        assert_eq!(hours_until(now + Duration::minutes(90), now), 1.5);
        assert!(hours_until(now - Duration::minutes(1), now) < 0.0);
        assert_eq!(hours_until(now, now), 0.0);
    }

    #[test]
    fn test_format_event_time() {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 15, 5, 0).unwrap();

        assert_eq!(
            format_event_time_in(start, &Utc),
            "Monday, March 4, 2024 at 3:05 PM UTC"
        );
        assert_eq!(
            format_event_time_in(start, &chrono_tz::Europe::Helsinki),
            "Monday, March 4, 2024 at 5:05 PM EET"
        );
    }

    #[test]
    fn test_resolve_local() {
        let naive = NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let resolved = resolve_local(&chrono_tz::Europe::Helsinki, &naive).unwrap();
        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 3, 4, 7, 30, 0).unwrap());

        // 03:30 does not exist on the spring-forward day in Helsinki
        let gap = NaiveDate::from_ymd_opt(2024, 3, 31)
            .unwrap()
            .and_hms_opt(3, 30, 0)
            .unwrap();
        assert!(resolve_local(&chrono_tz::Europe::Helsinki, &gap).is_none());
    }
}
