//! Owner-scoped realtime store.
//!
//! A [`CollectionStore`] whose reads are always restricted to one owner
//! (`userId == owner`) and whose load latency is shorter. On top of plain
//! CRUD it exposes the notification and health operations, which write into
//! their own collections regardless of the path this store views.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tracing::debug;

use super::collection_store::{CollectionStore, StoreState};
use crate::database::models::{
    Document, Fields, Filter, NewHealthAlert, NewNotification, ACKNOWLEDGED_AT_FIELD,
    ACKNOWLEDGED_FIELD, HEALTH_ALERTS, HEALTH_METRICS, NOTIFICATIONS, READ_AT_FIELD, READ_FIELD,
    TIMESTAMP_FIELD, UPDATED_AT_FIELD, USER_ID_FIELD,
};
use crate::database::Substrate;
use crate::error::{StoreError, StoreResult};
use crate::latency::{Latency, TokioLatency};
use crate::utils::{new_id, now_iso};

/// Default simulated latency of the realtime channel.
pub const DEFAULT_REALTIME_LATENCY_MS: u64 = 100;

/// Realtime store scoped to one owner.
#[derive(Debug)]
pub struct RealtimeStore {
    inner: CollectionStore,
}

impl RealtimeStore {
    /// Create a store over `path`.
    ///
    /// The owner is `target` when given, otherwise the acting identity.
    pub fn new(
        substrate: Substrate,
        path: impl Into<String>,
        actor: Option<String>,
        target: Option<String>,
    ) -> Self {
        let owner = target.or(actor);
        let inner = CollectionStore::new(substrate, path, owner.clone())
            .with_filters(scope_filters(owner.as_deref()))
            .with_latency(Arc::new(TokioLatency::from_millis(DEFAULT_REALTIME_LATENCY_MS)))
            .with_created_field(TIMESTAMP_FIELD);

        Self { inner }
    }

    /// Replace the simulated load latency (builder pattern).
    #[must_use]
    pub fn with_latency(self, latency: Arc<dyn Latency>) -> Self {
        Self {
            inner: self.inner.with_latency(latency),
        }
    }

    /// Identity every read and domain write is scoped to.
    pub fn owner(&self) -> Option<String> {
        self.inner.actor()
    }

    pub fn path(&self) -> String {
        self.inner.collection()
    }

    /// Re-scope to another owner (or none), invalidating any pending load.
    pub fn set_owner(&self, owner: Option<String>) {
        let filters = scope_filters(owner.as_deref());
        self.inner.set_scope(owner, filters);
    }

    /// Switch to another path.
    pub fn set_path(&self, path: impl Into<String>) {
        self.inner.set_collection(path);
    }

    pub fn state(&self) -> StoreState {
        self.inner.state()
    }

    pub fn data(&self) -> Vec<Document> {
        self.inner.data()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.is_loading()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.inner.subscribe()
    }

    pub async fn load(&self) {
        self.inner.load().await;
    }

    pub fn refresh(&self) {
        self.inner.refresh();
    }

    /// Append a document owned by this store's owner.
    ///
    /// `userId` defaults to the owner so the new document stays visible.
    pub async fn add(&self, mut fields: Fields) -> StoreResult<String> {
        let owner = self.require_owner()?;
        fields
            .entry(USER_ID_FIELD.to_string())
            .or_insert(Value::String(owner));
        self.inner.add(fields).await
    }

    pub async fn update(&self, id: &str, partial: Fields) -> StoreResult<()> {
        self.inner.update(id, partial).await
    }

    pub async fn remove(&self, id: &str) -> StoreResult<()> {
        self.inner.remove(id).await
    }

    pub async fn get_by_id(&self, id: &str) -> Option<Document> {
        self.inner.get_by_id(id).await
    }

    /// Flag a document in this store's path as read.
    pub async fn mark_as_read(&self, id: &str) -> StoreResult<()> {
        let mut partial = Fields::new();
        partial.insert(READ_FIELD.to_string(), Value::Bool(true));
        partial.insert(READ_AT_FIELD.to_string(), Value::String(now_iso()));
        self.inner.update(id, partial).await
    }

    /// Flag a document in this store's path as acknowledged.
    pub async fn acknowledge_alert(&self, id: &str) -> StoreResult<()> {
        let mut partial = Fields::new();
        partial.insert(ACKNOWLEDGED_FIELD.to_string(), Value::Bool(true));
        partial.insert(ACKNOWLEDGED_AT_FIELD.to_string(), Value::String(now_iso()));
        self.inner.update(id, partial).await
    }

    /// Raise a notification for the owner in `notifications`.
    pub async fn add_notification(&self, notification: NewNotification) -> StoreResult<String> {
        let owner = self.require_owner()?;
        let mut fields = notification.into_fields();
        fields.insert(READ_FIELD.to_string(), Value::Bool(false));
        self.append_owned(NOTIFICATIONS, &owner, fields)
    }

    /// Raise a health alert for the owner in `health_alerts`.
    pub async fn add_health_alert(&self, alert: NewHealthAlert) -> StoreResult<String> {
        let owner = self.require_owner()?;
        let mut fields = alert.into_fields();
        fields.insert(ACKNOWLEDGED_FIELD.to_string(), Value::Bool(false));
        self.append_owned(HEALTH_ALERTS, &owner, fields)
    }

    /// Upsert the owner's single record in `health_metrics`.
    ///
    /// An existing record keeps its id and position and has `metrics` merged
    /// over it; otherwise a new record is appended. The record always stays
    /// owned by this store's owner. Returns the record id.
    pub async fn update_health_metrics(&self, metrics: Fields) -> StoreResult<String> {
        let owner = self.require_owner()?;
        let substrate = self.inner.substrate();
        let mut docs = substrate.load(HEALTH_METRICS);

        let id = match docs.iter_mut().find(|d| d.is_owned_by(&owner)) {
            Some(existing) => {
                existing.merge(&metrics);
                existing.set(USER_ID_FIELD, owner.clone());
                existing.set(UPDATED_AT_FIELD, now_iso());
                existing.id.clone()
            }
            None => {
                let mut doc = Document::new(new_id(), metrics);
                doc.set(USER_ID_FIELD, owner.clone());
                doc.set(UPDATED_AT_FIELD, now_iso());
                let id = doc.id.clone();
                docs.push(doc);
                id
            }
        };

        self.inner.persist(HEALTH_METRICS, &docs)?;
        debug!("Upserted health metrics {} for {}", id, owner);
        Ok(id)
    }

    fn append_owned(&self, collection: &str, owner: &str, fields: Fields) -> StoreResult<String> {
        let mut doc = Document::new(new_id(), fields);
        doc.set(USER_ID_FIELD, owner);
        doc.set(TIMESTAMP_FIELD, now_iso());
        let id = doc.id.clone();

        let mut docs = self.inner.substrate().load(collection);
        docs.push(doc);
        self.inner.persist(collection, &docs)?;

        debug!("Appended {} to {} for {}", id, collection, owner);
        Ok(id)
    }

    fn require_owner(&self) -> StoreResult<String> {
        self.owner().ok_or_else(|| {
            let err = StoreError::Unauthenticated;
            self.inner.record_error(&err);
            err
        })
    }
}

fn scope_filters(owner: Option<&str>) -> Vec<Filter> {
    owner
        .map(|o| vec![Filter::eq(USER_ID_FIELD, o)])
        .unwrap_or_default()
}
