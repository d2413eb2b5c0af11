mod common;

use common::{memory_substrate, no_latency};
use localfire::database::{
    fields, HealthAlert, NewHealthAlert, NewNotification, Notification, Priority, Severity,
    HEALTH_ALERTS, HEALTH_METRICS, NOTIFICATIONS,
};
use localfire::{Document, RealtimeStore, StoreError, Substrate};
use serde_json::json;

fn realtime(substrate: &Substrate, path: &str, owner: &str) -> RealtimeStore {
    RealtimeStore::new(substrate.clone(), path, Some(owner.to_string()), None)
        .with_latency(no_latency())
}

#[tokio::test]
async fn reads_are_scoped_to_owner() {
    let (_, substrate) = memory_substrate();
    substrate
        .save(
            "medications",
            &[
                Document::new("1", fields(json!({"userId": "u1", "name": "A"}))),
                Document::new("2", fields(json!({"userId": "u2", "name": "B"}))),
                Document::new("3", fields(json!({"userId": "u1", "name": "C"}))),
            ],
        )
        .unwrap();

    let store = realtime(&substrate, "medications", "u1");
    store.load().await;
    let ids: Vec<_> = store.data().into_iter().map(|d| d.id).collect();
    assert_eq!(ids, vec!["1".to_string(), "3".to_string()]);

    store.set_owner(Some("u2".to_string()));
    assert!(store.is_loading());
    store.load().await;
    let ids: Vec<_> = store.data().into_iter().map(|d| d.id).collect();
    assert_eq!(ids, vec!["2".to_string()]);
}

#[tokio::test]
async fn explicit_target_overrides_actor() {
    let (_, substrate) = memory_substrate();
    let store = RealtimeStore::new(
        substrate,
        NOTIFICATIONS,
        Some("doctor-1".to_string()),
        Some("patient-9".to_string()),
    )
    .with_latency(no_latency());

    assert_eq!(store.owner().as_deref(), Some("patient-9"));
}

#[tokio::test]
async fn add_stamps_owner_and_timestamp() {
    let (_, substrate) = memory_substrate();
    let store = realtime(&substrate, "vitals", "u1");
    store.load().await;

    let id = store.add(fields(json!({"pulse": 72}))).await.unwrap();
    let doc = store.get_by_id(&id).await.unwrap();
    assert_eq!(doc.get_str("userId"), Some("u1"));
    assert!(doc.get_str("timestamp").is_some());
    assert_eq!(store.data(), vec![doc]);
}

#[tokio::test]
async fn notification_then_mark_as_read() {
    let (_, substrate) = memory_substrate();
    let store = realtime(&substrate, NOTIFICATIONS, "u1");
    store.load().await;

    let id = store
        .add_notification(
            NewNotification::new("dose", "Reminder", "Take pill").priority(Priority::High),
        )
        .await
        .unwrap();

    let stored = substrate.load(NOTIFICATIONS);
    assert_eq!(stored.len(), 1);
    let doc = &stored[0];
    assert_eq!(doc.id, id);
    assert_eq!(doc.get_str("userId"), Some("u1"));
    assert_eq!(doc.get_str("type"), Some("dose"));
    assert_eq!(doc.get_str("title"), Some("Reminder"));
    assert_eq!(doc.get_str("message"), Some("Take pill"));
    assert_eq!(doc.get_str("priority"), Some("high"));
    assert_eq!(doc.get_bool("read"), Some(false));
    assert!(doc.get_str("timestamp").is_some());

    // the store views the same collection, so memory follows
    assert_eq!(store.data().len(), 1);

    store.mark_as_read(&id).await.unwrap();
    let read = Notification::try_from(&store.get_by_id(&id).await.unwrap()).unwrap();
    assert!(read.read);
    assert!(read.read_at.is_some());
    assert_eq!(read.title, "Reminder");
}

#[tokio::test]
async fn notification_bypasses_store_path() {
    let (_, substrate) = memory_substrate();
    let store = realtime(&substrate, "chat_messages", "u1");
    store.load().await;

    store
        .add_notification(NewNotification::new("message", "New reply", "Dr. Lee replied"))
        .await
        .unwrap();

    assert_eq!(substrate.load(NOTIFICATIONS).len(), 1);
    assert!(substrate.load("chat_messages").is_empty());
    assert!(store.data().is_empty());
}

#[tokio::test]
async fn mark_as_read_missing_is_not_found() {
    let (_, substrate) = memory_substrate();
    let store = realtime(&substrate, NOTIFICATIONS, "u1");
    let err = store.mark_as_read("ghost").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(substrate.load(NOTIFICATIONS).is_empty());
}

#[tokio::test]
async fn health_metrics_upsert_one_record_per_owner() {
    let (_, substrate) = memory_substrate();
    let u1 = realtime(&substrate, "dashboard", "u1");
    let u2 = realtime(&substrate, "dashboard", "u2");

    let first = u1
        .update_health_metrics(fields(json!({"heartRate": 70, "steps": 1000})))
        .await
        .unwrap();
    u2.update_health_metrics(fields(json!({"heartRate": 60})))
        .await
        .unwrap();
    let second = u1
        .update_health_metrics(fields(json!({"heartRate": 75})))
        .await
        .unwrap();
    assert_eq!(first, second);

    let stored = substrate.load(HEALTH_METRICS);
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].id, first);

    let mine: Vec<_> = stored.iter().filter(|d| d.is_owned_by("u1")).collect();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].get("heartRate"), Some(json!(75)));
    assert_eq!(mine[0].get("steps"), Some(json!(1000)));
    assert!(mine[0].get_str("updatedAt").is_some());
}

#[tokio::test]
async fn health_metrics_stay_with_their_owner() {
    let (_, substrate) = memory_substrate();
    let u1 = realtime(&substrate, "dashboard", "u1");
    let u2 = realtime(&substrate, "dashboard", "u2");

    u2.update_health_metrics(fields(json!({"heartRate": 60})))
        .await
        .unwrap();
    let id = u1
        .update_health_metrics(fields(json!({"heartRate": 70})))
        .await
        .unwrap();
    let again = u1
        .update_health_metrics(fields(json!({"userId": "u2", "heartRate": 71})))
        .await
        .unwrap();
    assert_eq!(id, again);

    let stored = substrate.load(HEALTH_METRICS);
    assert_eq!(stored.iter().filter(|d| d.is_owned_by("u2")).count(), 1);
    let mine: Vec<_> = stored.iter().filter(|d| d.is_owned_by("u1")).collect();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, id);
    assert_eq!(mine[0].get("heartRate"), Some(json!(71)));
}

#[tokio::test]
async fn health_alert_then_acknowledge() {
    let (_, substrate) = memory_substrate();
    let store = realtime(&substrate, HEALTH_ALERTS, "u1");
    store.load().await;

    let id = store
        .add_health_alert(
            NewHealthAlert::new("blood_pressure", Severity::High, "BP 160/100")
                .with("reading", json!({"systolic": 160, "diastolic": 100})),
        )
        .await
        .unwrap();

    let alert = HealthAlert::try_from(&store.get_by_id(&id).await.unwrap()).unwrap();
    assert!(!alert.acknowledged);
    assert_eq!(alert.severity, Severity::High);
    assert_eq!(alert.user_id, "u1");
    assert!(alert.extra.contains_key("reading"));

    store.acknowledge_alert(&id).await.unwrap();
    let alert = HealthAlert::try_from(&store.get_by_id(&id).await.unwrap()).unwrap();
    assert!(alert.acknowledged);
    assert!(alert.acknowledged_at.is_some());

    assert!(store.acknowledge_alert("missing").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn domain_operations_require_an_owner() {
    let (_, substrate) = memory_substrate();
    let store = RealtimeStore::new(substrate.clone(), NOTIFICATIONS, None, None)
        .with_latency(no_latency());

    assert!(!store.is_loading());
    let err = store
        .add_notification(NewNotification::new("dose", "t", "m"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Unauthenticated));
    assert!(matches!(
        store.update_health_metrics(fields(json!({}))).await,
        Err(StoreError::Unauthenticated)
    ));
    assert_eq!(
        store.state().error.as_deref(),
        Some("no authenticated user")
    );
    assert!(substrate.collections().is_empty());
}
