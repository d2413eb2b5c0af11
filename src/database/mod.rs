//! Database module exports.
//!
//! - `substrate` - whole-collection load/save over a key-value backend
//! - `models` - documents, filters and typed notification shapes
//! - `repository` - collection and realtime stores

pub mod models;
mod repository;
mod substrate;

pub use models::*;
pub use repository::{
    CollectionStore, RealtimeStore, StoreState, DEFAULT_COLLECTION_LATENCY_MS,
    DEFAULT_REALTIME_LATENCY_MS,
};
pub use substrate::{key_for, Substrate, KEY_PREFIX};
