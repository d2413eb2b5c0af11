//! Generic collection store.
//!
//! CRUD and filtered reads over one named collection for the current actor.
//! The persisted collection is the source of truth; the in-memory state is
//! always the filtered view of the last successfully written (or loaded)
//! collection.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::database::models::{
    apply_filters, Document, Fields, Filter, CREATED_AT_FIELD, UPDATED_AT_FIELD,
};
use crate::database::Substrate;
use crate::error::{StoreError, StoreResult};
use crate::latency::{Latency, TokioLatency};
use crate::utils::{new_id, now_iso};

/// Default simulated latency of the initial load.
pub const DEFAULT_COLLECTION_LATENCY_MS: u64 = 500;

/// Readable state exposed to consumers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    /// Filtered documents in storage order.
    pub data: Vec<Document>,
    /// True until the pending load resolves.
    pub loading: bool,
    /// Last error recorded by a failed operation.
    pub error: Option<String>,
}

impl StoreState {
    fn resolved_empty() -> Self {
        Self::default()
    }

    fn pending() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }
}

/// Parameters whose change invalidates an in-flight load.
#[derive(Debug, Clone)]
struct QueryParams {
    collection: String,
    filters: Vec<Filter>,
    actor: Option<String>,
}

/// Collection store over one named collection.
pub struct CollectionStore {
    substrate: Substrate,
    latency: Arc<dyn Latency>,
    params: RwLock<QueryParams>,
    generation: AtomicU64,
    state: watch::Sender<StoreState>,
    created_field: &'static str,
}

impl CollectionStore {
    /// Create a store for `collection` on behalf of `actor`.
    ///
    /// Nothing is read until [`load`](Self::load) is awaited.
    pub fn new(substrate: Substrate, collection: impl Into<String>, actor: Option<String>) -> Self {
        let initial = if actor.is_some() {
            StoreState::pending()
        } else {
            StoreState::resolved_empty()
        };
        let (state, _) = watch::channel(initial);

        Self {
            substrate,
            latency: Arc::new(TokioLatency::from_millis(DEFAULT_COLLECTION_LATENCY_MS)),
            params: RwLock::new(QueryParams {
                collection: collection.into(),
                filters: Vec::new(),
                actor,
            }),
            generation: AtomicU64::new(0),
            state,
            created_field: CREATED_AT_FIELD,
        }
    }

    /// Set the initial filter list (builder pattern).
    #[must_use]
    pub fn with_filters(self, filters: Vec<Filter>) -> Self {
        self.params.write().filters = filters;
        self
    }

    /// Replace the simulated load latency (builder pattern).
    #[must_use]
    pub fn with_latency(mut self, latency: Arc<dyn Latency>) -> Self {
        self.latency = latency;
        self
    }

    /// Field stamped with the creation time on `add`.
    #[must_use]
    pub(crate) fn with_created_field(mut self, field: &'static str) -> Self {
        self.created_field = field;
        self
    }

    pub fn collection(&self) -> String {
        self.params.read().collection.clone()
    }

    pub fn filters(&self) -> Vec<Filter> {
        self.params.read().filters.clone()
    }

    pub fn actor(&self) -> Option<String> {
        self.params.read().actor.clone()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> StoreState {
        self.state.borrow().clone()
    }

    /// Current documents.
    pub fn data(&self) -> Vec<Document> {
        self.state.borrow().data.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    /// Run the initial load.
    ///
    /// Anonymous callers resolve to an empty state without touching storage.
    /// If the query parameters change (or [`refresh`](Self::refresh) is
    /// called) while this load waits out its latency, its result is dropped.
    pub async fn load(&self) {
        let (generation, actor) = {
            let params = self.params.read();
            (self.generation.load(Ordering::SeqCst), params.actor.clone())
        };

        if actor.is_none() {
            self.state.send_replace(StoreState::resolved_empty());
            return;
        }

        self.state.send_modify(|s| s.loading = true);
        self.latency.wait().await;

        let params = self.params.read();
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding superseded load of {}", params.collection);
            return;
        }

        let docs = apply_filters(self.substrate.load(&params.collection), &params.filters);
        debug!("Loaded {} matching documents from {}", docs.len(), params.collection);
        self.state.send_modify(|s| {
            s.data = docs;
            s.loading = false;
            s.error = None;
        });
    }

    /// Force the store back into loading; the next `load` re-reads storage.
    pub fn refresh(&self) {
        self.reconfigure(|_| {});
    }

    /// Switch to another collection.
    pub fn set_collection(&self, collection: impl Into<String>) {
        let collection = collection.into();
        self.reconfigure(|p| p.collection = collection);
    }

    /// Replace the filter list.
    pub fn set_filters(&self, filters: Vec<Filter>) {
        self.reconfigure(|p| p.filters = filters);
    }

    /// Change (or clear) the acting identity.
    pub fn set_actor(&self, actor: Option<String>) {
        self.reconfigure(|p| p.actor = actor);
    }

    /// Replace actor and filters together.
    pub(crate) fn set_scope(&self, actor: Option<String>, filters: Vec<Filter>) {
        self.reconfigure(|p| {
            p.actor = actor;
            p.filters = filters;
        });
    }

    fn reconfigure(&self, change: impl FnOnce(&mut QueryParams)) {
        let mut params = self.params.write();
        change(&mut *params);
        self.generation.fetch_add(1, Ordering::SeqCst);

        if params.actor.is_some() {
            self.state.send_modify(|s| s.loading = true);
        } else {
            self.state.send_replace(StoreState::resolved_empty());
        }
    }

    /// Append a new document and return its id.
    ///
    /// The id and creation timestamp are always assigned here. The document is
    /// persisted even when it fails the active filters; the in-memory state is
    /// republished as the filtered view of the written collection, so such a
    /// document is stored but not shown.
    pub async fn add(&self, fields: Fields) -> StoreResult<String> {
        let collection = self.require_actor()?;

        let mut doc = Document::new(new_id(), fields);
        doc.set(self.created_field, now_iso());
        let id = doc.id.clone();

        let mut docs = self.substrate.load(&collection);
        docs.push(doc);
        self.persist(&collection, &docs)?;

        debug!("Added document {} to {}", id, collection);
        Ok(id)
    }

    /// Merge `partial` into document `id` and stamp `updatedAt`.
    pub async fn update(&self, id: &str, partial: Fields) -> StoreResult<()> {
        let collection = self.require_actor()?;
        let mut docs = self.substrate.load(&collection);

        let Some(doc) = docs.iter_mut().find(|d| d.id == id) else {
            return Err(self.not_found(&collection, id));
        };
        doc.merge(&partial);
        doc.set(UPDATED_AT_FIELD, now_iso());

        self.persist(&collection, &docs)?;
        debug!("Updated document {} in {}", id, collection);
        Ok(())
    }

    /// Delete document `id`.
    pub async fn remove(&self, id: &str) -> StoreResult<()> {
        let collection = self.require_actor()?;
        let mut docs = self.substrate.load(&collection);

        let Some(pos) = docs.iter().position(|d| d.id == id) else {
            return Err(self.not_found(&collection, id));
        };
        docs.remove(pos);

        self.persist(&collection, &docs)?;
        debug!("Removed document {} from {}", id, collection);
        Ok(())
    }

    /// Read one document straight from storage.
    ///
    /// Ignores filters; anonymous callers always get `None`.
    pub async fn get_by_id(&self, id: &str) -> Option<Document> {
        let params = self.params.read().clone();
        params.actor.as_ref()?;
        self.substrate
            .load(&params.collection)
            .into_iter()
            .find(|d| d.id == id)
    }

    /// Save `docs` as the full `collection` and, if it is the collection
    /// this store views, republish the filtered in-memory state.
    pub(crate) fn persist(&self, collection: &str, docs: &[Document]) -> StoreResult<()> {
        if let Err(e) = self.substrate.save(collection, docs) {
            self.record_error(&e);
            return Err(e);
        }

        let params = self.params.read();
        if params.collection == collection && params.actor.is_some() {
            let visible = apply_filters(docs.to_vec(), &params.filters);
            self.state.send_modify(|s| {
                s.data = visible;
                s.error = None;
            });
        }
        Ok(())
    }

    pub(crate) fn substrate(&self) -> &Substrate {
        &self.substrate
    }

    fn require_actor(&self) -> StoreResult<String> {
        let params = self.params.read();
        if params.actor.is_none() {
            let err = StoreError::Unauthenticated;
            drop(params);
            self.record_error(&err);
            return Err(err);
        }
        Ok(params.collection.clone())
    }

    fn not_found(&self, collection: &str, id: &str) -> StoreError {
        warn!("Document {} not found in {}", id, collection);
        let err = StoreError::NotFound(id.to_string());
        self.record_error(&err);
        err
    }

    pub(crate) fn record_error(&self, err: &StoreError) {
        let message = err.to_string();
        self.state.send_modify(|s| s.error = Some(message));
    }
}

impl std::fmt::Debug for CollectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params = self.params.read();
        f.debug_struct("CollectionStore")
            .field("collection", &params.collection)
            .field("filters", &params.filters.len())
            .field("actor", &params.actor)
            .finish()
    }
}
