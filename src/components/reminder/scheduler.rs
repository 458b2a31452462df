use super::service::ReminderService;
use crate::components::calendar_feed::CalendarEvent;
use crate::components::state_store::SentEvents;
use crate::config::Config;
use crate::utils::time::hours_until;
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration as TokioDuration};
use tracing::{error, info};

/// Timing rules for when a reminder is due
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotificationPolicy {
    pub send_immediately: bool,
    pub notification_window_hours: f64,
}

impl From<&Config> for NotificationPolicy {
    fn from(config: &Config) -> Self {
        Self {
            send_immediately: config.send_immediately,
            notification_window_hours: config.notification_window_hours,
        }
    }
}

/// Decide whether an event should get a reminder now
///
/// Events that already started or were already sent are never due.
pub fn is_due(
    event: &CalendarEvent,
    now: DateTime<Utc>,
    sent: &SentEvents,
    policy: &NotificationPolicy,
) -> bool {
    if event.start_time <= now || sent.was_sent(&event.id) {
        return false;
    }

    if policy.send_immediately {
        return true;
    }

    let hours = hours_until(event.start_time, now);
    (0.0..=policy.notification_window_hours).contains(&hours)
}

/// Run a reminder cycle now and then every `interval`
pub fn start_scheduler(service: ReminderService, interval: TokioDuration) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let report = service.run_cycle().await;
            if report.failed > 0 {
                error!("{} reminders failed in this cycle", report.failed);
            }
            info!(
                "Reminder cycle done: {} fetched, {} due, {} sent, {} skipped; next check in {}s",
                report.fetched,
                report.due,
                report.sent,
                report.skipped,
                interval.as_secs()
            );

            sleep(interval).await;
        }
    })
}
