#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rsvpbot::components::calendar_feed::{CalendarEvent, CalendarSource};
use rsvpbot::components::state_store::{StateStoreActor, StateStoreHandle};
use rsvpbot::config::Config;
use rsvpbot::error::{transport_error, BotResult, Error};
use rsvpbot::transport::Transport;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

/// Mock transport that records every outgoing message
#[derive(Debug, Default)]
pub struct MockTransport {
    sent: Mutex<Vec<(String, String)>>,
    unregistered: HashSet<String>,
    failing: HashSet<String>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report the address as not registered
    pub fn with_unregistered(mut self, address: &str) -> Self {
        self.unregistered.insert(address.to_string());
        self
    }

    /// Fail every send to the address
    pub fn failing_for(mut self, address: &str) -> Self {
        self.failing.insert(address.to_string());
        self
    }

    /// All messages sent so far as (address, text)
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Messages sent to one address
    pub fn sent_to(&self, address: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(to, _)| to == address)
            .map(|(_, text)| text)
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_message(&self, address: &str, text: &str) -> BotResult<()> {
        if self.failing.contains(address) {
            return Err(transport_error(&format!("delivery to {} failed", address)));
        }
        self.sent
            .lock()
            .unwrap()
            .push((address.to_string(), text.to_string()));
        Ok(())
    }

    async fn is_registered_address(&self, address: &str) -> BotResult<bool> {
        Ok(!self.unregistered.contains(address))
    }
}

/// Mock calendar source returning a fixed list of events
#[derive(Debug, Clone, Default)]
pub struct MockCalendarSource {
    events: Vec<CalendarEvent>,
    fail: bool,
}

impl MockCalendarSource {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self { events, fail: false }
    }

    /// A source whose every fetch fails like an unreachable feed
    pub fn failing() -> Self {
        Self {
            events: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl CalendarSource for MockCalendarSource {
    async fn fetch_events(&self) -> BotResult<Vec<CalendarEvent>> {
        if self.fail {
            return Err(Error::Fetch { status: 503 });
        }
        Ok(self.events.clone())
    }
}

pub const ADMIN: &str = "15550000000";

/// Test configuration with a 12 hour window
pub fn test_config(state_dir: &Path) -> Arc<RwLock<Config>> {
    Arc::new(RwLock::new(Config {
        calendar_url: "webcal://calendar.example.com/published/test".to_string(),
        admin_address: ADMIN.to_string(),
        send_immediately: false,
        notification_window_hours: 12.0,
        check_interval_secs: 300,
        pending_expiry_hours: 168,
        state_dir: state_dir.to_path_buf(),
        bot_locale: "en".to_string(),
    }))
}

/// Spawn a state store actor over `state_dir`
pub fn spawn_store(state_dir: &Path) -> StateStoreHandle {
    let (mut actor, handle) = StateStoreActor::new(state_dir, Duration::hours(168));
    tokio::spawn(async move {
        actor.run().await;
    });
    handle
}

/// Event starting `hours` from now
pub fn event_in_hours(id: &str, title: &str, hours: i64) -> CalendarEvent {
    CalendarEvent::new(id, title, Utc::now() + Duration::hours(hours))
}
