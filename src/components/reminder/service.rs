use super::contact::extract_contact;
use super::notifications::{admin_error_text, send_reminder};
use super::replies::handle_reply;
use super::scheduler::{is_due, NotificationPolicy};
use crate::components::calendar_feed::{CalendarSource, NotifiableEvent};
use crate::components::state_store::{Decision, PendingResponse, StateStoreHandle};
use crate::config::Config;
use crate::error::BotResult;
use crate::transport::{InboundMessage, Transport};
use crate::utils::time::format_event_time;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Counters for one reminder cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub due: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Outcome of notifying a single event
enum SendOutcome {
    Sent,
    Unregistered,
}

/// Ties the calendar, state store and transport together
#[derive(Clone)]
pub struct ReminderService {
    config: Arc<RwLock<Config>>,
    source: Arc<dyn CalendarSource>,
    transport: Arc<dyn Transport>,
    store: StateStoreHandle,
}

impl ReminderService {
    pub fn new(
        config: Arc<RwLock<Config>>,
        source: Arc<dyn CalendarSource>,
        transport: Arc<dyn Transport>,
        store: StateStoreHandle,
    ) -> Self {
        Self {
            config,
            source,
            transport,
            store,
        }
    }

    /// Run one fetch/filter/extract/send cycle against the current time
    pub async fn run_cycle(&self) -> CycleReport {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle as if the current time were `now`
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> CycleReport {
        let mut report = CycleReport::default();

        let (policy, admin_address) = {
            let config_read = self.config.read().await;
            (
                NotificationPolicy::from(&*config_read),
                config_read.admin_address.clone(),
            )
        };

        let events = match self.source.fetch_events().await {
            Ok(events) => events,
            Err(e) => {
                error!("Error fetching events: {}", e);
                return report;
            }
        };
        report.fetched = events.len();

        let sent = match self.store.sent_snapshot().await {
            Ok(sent) => sent,
            Err(e) => {
                error!("Could not read sent events, skipping cycle: {}", e);
                return report;
            }
        };

        let mut notifiable = Vec::new();
        for event in events {
            if event.start_time <= now {
                continue;
            }
            if sent.was_sent(&event.id) {
                debug!("Event {} was already sent", event.id);
                continue;
            }
            if !is_due(&event, now, &sent, &policy) {
                debug!("Event {} is not within the notification window", event.id);
                continue;
            }

            report.due += 1;
            match extract_contact(&event) {
                Some(contact_address) => notifiable.push(NotifiableEvent {
                    event,
                    contact_address,
                }),
                None => {
                    warn!("No phone number found for event {} ({})", event.id, event.title);
                    report.skipped += 1;
                }
            }
        }

        if notifiable.is_empty() {
            info!("No new events to send");
            return report;
        }

        // One at a time, in feed order
        for item in &notifiable {
            match self.notify(item, &admin_address).await {
                Ok(SendOutcome::Sent) => report.sent += 1,
                Ok(SendOutcome::Unregistered) => report.skipped += 1,
                Err(e) => {
                    report.failed += 1;
                    error!("Error sending reminder for event {}: {}", item.event.id, e);
                    if let Err(admin_err) = self
                        .transport
                        .send_message(&admin_address, &admin_error_text(&e.to_string()))
                        .await
                    {
                        error!("Failed to notify admin about error: {}", admin_err);
                    }
                }
            }
        }

        report
    }

    async fn notify(&self, item: &NotifiableEvent, admin_address: &str) -> BotResult<SendOutcome> {
        let address = &item.contact_address;

        if !self.transport.is_registered_address(address).await? {
            warn!("Address {} is not registered, skipping event {}", address, item.event.id);
            return Ok(SendOutcome::Unregistered);
        }

        let time_display = format_event_time(item.event.start_time);
        send_reminder(self.transport.as_ref(), admin_address, item, &time_display).await?;

        self.store.mark_sent(item.event.id.clone()).await?;

        // Delivered and marked sent, correlation is best-effort
        if let Err(e) = self
            .store
            .set_pending(
                address.clone(),
                PendingResponse {
                    event_id: item.event.id.clone(),
                    event_title: item.event.title.clone(),
                    event_time: time_display,
                    created_at: Utc::now(),
                },
            )
            .await
        {
            error!("Failed to record pending response for {}: {}", address, e);
        }

        Ok(SendOutcome::Sent)
    }

    /// Handle one inbound message, logging instead of propagating failures
    pub async fn handle_inbound(&self, message: InboundMessage) -> Option<Decision> {
        let admin_address = {
            let config_read = self.config.read().await;
            config_read.admin_address.clone()
        };

        match handle_reply(self.transport.as_ref(), &self.store, &admin_address, &message).await {
            Ok(decision) => decision,
            Err(e) => {
                error!("Error processing response from {}: {}", message.from, e);
                None
            }
        }
    }
}
