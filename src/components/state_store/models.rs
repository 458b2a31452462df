use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Event ids that already had a reminder sent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentEvents(BTreeMap<String, bool>);

impl SentEvents {
    pub fn was_sent(&self, event_id: &str) -> bool {
        self.0.get(event_id).copied().unwrap_or(false)
    }

    pub fn mark(&mut self, event_id: impl Into<String>) {
        self.0.insert(event_id.into(), true);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Context of the most recent reminder sent to one contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingResponse {
    pub event_id: String,
    pub event_title: String,
    /// Event start as shown in the reminder
    pub event_time: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl PendingResponse {
    pub fn is_expired(&self, now: DateTime<Utc>, expiry: Duration) -> bool {
        now - self.created_at > expiry
    }
}

/// Pending responses keyed by contact address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingResponses(BTreeMap<String, PendingResponse>);

impl PendingResponses {
    /// Look up an entry that has not expired yet
    pub fn active(&self, address: &str, now: DateTime<Utc>, expiry: Duration) -> Option<&PendingResponse> {
        self.0
            .get(address)
            .filter(|pending| !pending.is_expired(now, expiry))
    }

    /// Replace any entry for the address
    pub fn insert(&mut self, address: impl Into<String>, pending: PendingResponse) {
        self.0.insert(address.into(), pending);
    }

    /// Drop expired entries, returning how many were removed
    pub fn prune(&mut self, now: DateTime<Utc>, expiry: Duration) -> usize {
        let before = self.0.len();
        self.0.retain(|_, pending| !pending.is_expired(now, expiry));
        before - self.0.len()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A classified reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Yes,
    No,
}

impl Decision {
    /// Classify a message body; only exact `yes`/`no` count
    pub fn from_reply(body: &str) -> Option<Self> {
        match body.to_lowercase().as_str() {
            "yes" => Some(Decision::Yes),
            "no" => Some(Decision::No),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Yes => "yes",
            Decision::No => "no",
        }
    }

    /// Verb used in the admin summary
    pub fn verdict(&self) -> &'static str {
        match self {
            Decision::Yes => "confirmed",
            Decision::No => "declined",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit record of one reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseLogEntry {
    pub response: Decision,
    pub timestamp: DateTime<Utc>,
}

/// Reply audit log keyed by event id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseLog(BTreeMap<String, ResponseLogEntry>);

impl ResponseLog {
    pub fn get(&self, key: &str) -> Option<&ResponseLogEntry> {
        self.0.get(key)
    }

    pub fn record(&mut self, key: impl Into<String>, entry: ResponseLogEntry) {
        self.0.insert(key.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
