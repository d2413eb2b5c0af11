//! Repository module - collection-level data access.

mod collection_store;
mod realtime_store;

pub use collection_store::{CollectionStore, StoreState, DEFAULT_COLLECTION_LATENCY_MS};
pub use realtime_store::{RealtimeStore, DEFAULT_REALTIME_LATENCY_MS};
