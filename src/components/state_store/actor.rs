use super::file::{load_or_default, save};
use super::models::{
    PendingResponse, PendingResponses, ResponseLog, ResponseLogEntry, SentEvents,
};
use crate::error::{store_error, BotResult};
use chrono::{Duration, Utc};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, info};

// State file names
pub mod files {
    pub const SENT_EVENTS: &str = "sent.json";
    pub const PENDING_RESPONSES: &str = "pending.json";
    pub const RESPONSES: &str = "responses.json";
}

/// The state store actor; sole owner and writer of the JSON state files
pub struct StateStoreActor {
    state_dir: PathBuf,
    pending_expiry: Duration,
    sent: SentEvents,
    pending: PendingResponses,
    responses: ResponseLog,
    command_rx: mpsc::Receiver<StateCommand>,
}

/// Commands that can be sent to the state store actor
pub enum StateCommand {
    SentSnapshot(mpsc::Sender<SentEvents>),
    WasSent(String, mpsc::Sender<bool>),
    MarkSent(String, mpsc::Sender<BotResult<()>>),
    SetPending(String, PendingResponse, mpsc::Sender<BotResult<()>>),
    GetPending(String, mpsc::Sender<Option<PendingResponse>>),
    RecordResponse(String, ResponseLogEntry, mpsc::Sender<BotResult<()>>),
    Responses(mpsc::Sender<ResponseLog>),
    Shutdown,
}

/// Handle for communicating with the state store actor
#[derive(Clone)]
pub struct StateStoreHandle {
    command_tx: mpsc::Sender<StateCommand>,
}

impl StateStoreHandle {
    /// Create a handle with no actor behind it; every request fails
    pub fn empty() -> Self {
        let (command_tx, _) = mpsc::channel(32);
        Self { command_tx }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(mpsc::Sender<T>) -> StateCommand,
    ) -> BotResult<T> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(command(response_tx))
            .await
            .map_err(|e| store_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| store_error("Response channel closed"))
    }

    /// Copy of the sent-events mapping
    pub async fn sent_snapshot(&self) -> BotResult<SentEvents> {
        self.request(StateCommand::SentSnapshot).await
    }

    /// Check whether a reminder was already sent for an event
    pub async fn was_sent(&self, event_id: impl Into<String>) -> BotResult<bool> {
        let event_id = event_id.into();
        self.request(|tx| StateCommand::WasSent(event_id, tx)).await
    }

    /// Mark an event as sent and persist immediately
    pub async fn mark_sent(&self, event_id: impl Into<String>) -> BotResult<()> {
        let event_id = event_id.into();
        self.request(|tx| StateCommand::MarkSent(event_id, tx)).await?
    }

    /// Record the event a contact is expected to reply about
    pub async fn set_pending(
        &self,
        address: impl Into<String>,
        pending: PendingResponse,
    ) -> BotResult<()> {
        let address = address.into();
        self.request(|tx| StateCommand::SetPending(address, pending, tx))
            .await?
    }

    /// Look up the unexpired pending response for a contact
    pub async fn pending_for(&self, address: impl Into<String>) -> BotResult<Option<PendingResponse>> {
        let address = address.into();
        self.request(|tx| StateCommand::GetPending(address, tx)).await
    }

    /// Append a classified reply to the audit log
    pub async fn record_response(
        &self,
        key: impl Into<String>,
        entry: ResponseLogEntry,
    ) -> BotResult<()> {
        let key = key.into();
        self.request(|tx| StateCommand::RecordResponse(key, entry, tx))
            .await?
    }

    /// Copy of the reply audit log
    pub async fn responses(&self) -> BotResult<ResponseLog> {
        self.request(StateCommand::Responses).await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BotResult<()> {
        let _ = self.command_tx.send(StateCommand::Shutdown).await;
        Ok(())
    }
}

impl StateStoreActor {
    /// Load state from `state_dir` and return the actor with its handle
    pub fn new(state_dir: impl Into<PathBuf>, pending_expiry: Duration) -> (Self, StateStoreHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let state_dir = state_dir.into();

        let sent: SentEvents = load_or_default(&state_dir.join(files::SENT_EVENTS));
        let pending: PendingResponses = load_or_default(&state_dir.join(files::PENDING_RESPONSES));
        let responses: ResponseLog = load_or_default(&state_dir.join(files::RESPONSES));

        info!(
            "Loaded state from {}: {} sent events, {} pending responses, {} responses",
            state_dir.display(),
            sent.len(),
            pending.len(),
            responses.len()
        );

        let actor = Self {
            state_dir,
            pending_expiry,
            sent,
            pending,
            responses,
            command_rx,
        };

        let handle = StateStoreHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("State store actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                StateCommand::SentSnapshot(response_tx) => {
                    let _ = response_tx.send(self.sent.clone()).await;
                }
                StateCommand::WasSent(event_id, response_tx) => {
                    let _ = response_tx.send(self.sent.was_sent(&event_id)).await;
                }
                StateCommand::MarkSent(event_id, response_tx) => {
                    let result = self.mark_sent(event_id);
                    let _ = response_tx.send(result).await;
                }
                StateCommand::SetPending(address, pending, response_tx) => {
                    let result = self.set_pending(address, pending);
                    let _ = response_tx.send(result).await;
                }
                StateCommand::GetPending(address, response_tx) => {
                    let pending = self
                        .pending
                        .active(&address, Utc::now(), self.pending_expiry)
                        .cloned();
                    let _ = response_tx.send(pending).await;
                }
                StateCommand::RecordResponse(key, entry, response_tx) => {
                    let result = self.record_response(key, entry);
                    let _ = response_tx.send(result).await;
                }
                StateCommand::Responses(response_tx) => {
                    let _ = response_tx.send(self.responses.clone()).await;
                }
                StateCommand::Shutdown => {
                    info!("State store actor shutting down");
                    break;
                }
            }
        }

        info!("State store actor shut down");
    }

    fn mark_sent(&mut self, event_id: String) -> BotResult<()> {
        debug!("Marking event {} as sent", event_id);
        self.sent.mark(event_id);
        save(&self.state_dir.join(files::SENT_EVENTS), &self.sent)
    }

    fn set_pending(&mut self, address: String, pending: PendingResponse) -> BotResult<()> {
        let pruned = self.pending.prune(Utc::now(), self.pending_expiry);
        if pruned > 0 {
            debug!("Pruned {} expired pending responses", pruned);
        }
        self.pending.insert(address, pending);
        save(&self.state_dir.join(files::PENDING_RESPONSES), &self.pending)
    }

    fn record_response(&mut self, key: String, entry: ResponseLogEntry) -> BotResult<()> {
        self.responses.record(key, entry);
        save(&self.state_dir.join(files::RESPONSES), &self.responses)
    }
}
