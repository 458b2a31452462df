use crate::components::calendar_feed::NotifiableEvent;
use crate::components::state_store::Decision;
use crate::error::BotResult;
use crate::transport::Transport;
use rust_i18n::t;
use tracing::info;

/// Reminder sent to the attendee
pub fn reminder_text(title: &str, time: &str) -> String {
    t!("reminder_message", title = title, time = time).to_string()
}

/// Admin notice after a reminder went out
pub fn admin_sent_text(address: &str) -> String {
    t!("admin_reminder_sent", address = address).to_string()
}

/// Admin notice when sending failed
pub fn admin_error_text(message: &str) -> String {
    t!("admin_error", message = message).to_string()
}

/// Acknowledgement sent back to the attendee
pub fn acknowledgement_text(decision: Decision) -> String {
    match decision {
        Decision::Yes => t!("reply_confirmed").to_string(),
        Decision::No => t!("reply_declined").to_string(),
    }
}

/// Admin summary of a reply
pub fn admin_reply_text(title: &str, decision: Decision, from: &str) -> String {
    let response = decision.as_str().to_uppercase();
    t!(
        "admin_reply_summary",
        title = title,
        verdict = decision.verdict(),
        response = response,
        from = from
    )
    .to_string()
}

/// Title reported when a reply cannot be correlated
pub fn unknown_event_title() -> String {
    t!("unknown_event").to_string()
}

/// Send the reminder to the attendee, then report it to the admin
pub async fn send_reminder(
    transport: &dyn Transport,
    admin_address: &str,
    notifiable: &NotifiableEvent,
    time_display: &str,
) -> BotResult<()> {
    let address = &notifiable.contact_address;

    info!("Sending reminder for event {} to {}", notifiable.event.id, address);
    transport
        .send_message(address, &reminder_text(&notifiable.event.title, time_display))
        .await?;

    info!("Sending confirmation to admin");
    transport
        .send_message(admin_address, &admin_sent_text(address))
        .await?;

    Ok(())
}
