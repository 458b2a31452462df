use super::notifications::{acknowledgement_text, admin_reply_text, unknown_event_title};
use crate::components::state_store::{Decision, ResponseLogEntry, StateStoreHandle};
use crate::error::BotResult;
use crate::transport::{InboundMessage, Transport};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Classify an inbound message and route it
///
/// Returns `Ok(None)` without side effects unless the body is exactly
/// `yes` or `no` (any case).
pub async fn handle_reply(
    transport: &dyn Transport,
    store: &StateStoreHandle,
    admin_address: &str,
    message: &InboundMessage,
) -> BotResult<Option<Decision>> {
    let Some(decision) = Decision::from_reply(&message.body) else {
        debug!("Ignoring message from {}", message.from);
        return Ok(None);
    };

    let contact = message.contact_key();
    let pending = store.pending_for(contact).await?;
    if pending.is_none() {
        warn!("No pending event for {}", contact);
    }

    let log_key = pending
        .as_ref()
        .map(|p| p.event_id.clone())
        .unwrap_or_else(|| contact.to_string());
    store
        .record_response(
            log_key,
            ResponseLogEntry {
                response: decision,
                timestamp: Utc::now(),
            },
        )
        .await?;

    transport
        .send_message(&message.from, &acknowledgement_text(decision))
        .await?;

    let title = pending
        .map(|p| p.event_title)
        .unwrap_or_else(unknown_event_title);
    transport
        .send_message(admin_address, &admin_reply_text(&title, decision, &message.from))
        .await?;

    info!("Forwarded response to admin: {}", decision);
    Ok(Some(decision))
}
