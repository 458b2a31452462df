mod mocks;

use chrono::{Duration, Utc};
use mocks::spawn_store;
use rsvpbot::components::state_store::{
    files, Decision, PendingResponse, ResponseLogEntry, StateStoreActor, StateStoreHandle,
};

fn pending(event_id: &str, title: &str) -> PendingResponse {
    PendingResponse {
        event_id: event_id.to_string(),
        event_title: title.to_string(),
        event_time: "Friday, March 8, 2024 at 9:00 AM UTC".to_string(),
        created_at: Utc::now(),
    }
}

/// Marking an event sent survives a restart
#[tokio::test]
async fn test_sent_events_round_trip() {
    let dir = tempfile::tempdir().unwrap();

    let store = spawn_store(dir.path());
    assert!(!store.was_sent("E1").await.unwrap());
    store.mark_sent("E1").await.unwrap();
    store.shutdown().await.unwrap();

    let reopened = spawn_store(dir.path());
    assert!(reopened.was_sent("E1").await.unwrap());
    assert!(!reopened.was_sent("E2").await.unwrap());
    assert!(reopened.sent_snapshot().await.unwrap().was_sent("E1"));
}

/// Pending responses and the reply log are persisted too
#[tokio::test]
async fn test_pending_and_responses_round_trip() {
    let dir = tempfile::tempdir().unwrap();

    let store = spawn_store(dir.path());
    store
        .set_pending("15551234567", pending("event-1", "Dentist"))
        .await
        .unwrap();
    store
        .record_response(
            "event-1",
            ResponseLogEntry {
                response: Decision::No,
                timestamp: Utc::now(),
            },
        )
        .await
        .unwrap();
    store.shutdown().await.unwrap();

    let reopened = spawn_store(dir.path());
    let restored = reopened.pending_for("15551234567").await.unwrap().unwrap();
    assert_eq!(restored.event_title, "Dentist");
    assert_eq!(
        reopened.responses().await.unwrap().get("event-1").unwrap().response,
        Decision::No
    );

    let raw = std::fs::read_to_string(dir.path().join(files::RESPONSES)).unwrap();
    let raw: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(raw["event-1"]["response"], "no");
    assert!(raw["event-1"]["timestamp"].is_string());
}

/// A newer reminder replaces the pending entry for the same contact
#[tokio::test]
async fn test_pending_is_overwritten_per_contact() {
    let dir = tempfile::tempdir().unwrap();
    let store = spawn_store(dir.path());

    store
        .set_pending("15551234567", pending("event-1", "Dentist"))
        .await
        .unwrap();
    store
        .set_pending("15551234567", pending("event-2", "Haircut"))
        .await
        .unwrap();

    let current = store.pending_for("15551234567").await.unwrap().unwrap();
    assert_eq!(current.event_id, "event-2");
}

/// Expired pending entries are not correlated
#[tokio::test]
async fn test_pending_expiry() {
    let dir = tempfile::tempdir().unwrap();
    let (mut actor, store) = StateStoreActor::new(dir.path(), Duration::hours(1));
    tokio::spawn(async move {
        actor.run().await;
    });

    let mut old = pending("event-1", "Dentist");
    old.created_at = Utc::now() - Duration::hours(2);
    store.set_pending("15551234567", old).await.unwrap();
    store
        .set_pending("15557654321", pending("event-2", "Haircut"))
        .await
        .unwrap();

    assert!(store.pending_for("15551234567").await.unwrap().is_none());
    assert!(store.pending_for("15557654321").await.unwrap().is_some());
}

/// Missing or corrupt files start with empty state
#[tokio::test]
async fn test_corrupt_state_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(files::SENT_EVENTS), "{ not json").unwrap();
    std::fs::write(dir.path().join(files::PENDING_RESPONSES), "[1, 2, 3]").unwrap();

    let store = spawn_store(dir.path());
    assert!(store.sent_snapshot().await.unwrap().is_empty());
    assert!(store.pending_for("15551234567").await.unwrap().is_none());

    // Writes replace the corrupt file
    store.mark_sent("E1").await.unwrap();
    let raw = std::fs::read_to_string(dir.path().join(files::SENT_EVENTS)).unwrap();
    let raw: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(raw, serde_json::json!({ "E1": true }));
}

/// Requests fail cleanly when no actor is running
#[tokio::test]
async fn test_empty_handle_errors() {
    let store = StateStoreHandle::empty();
    assert!(store.was_sent("E1").await.is_err());
    assert!(store.mark_sent("E1").await.is_err());
    assert!(store.shutdown().await.is_ok());
}
