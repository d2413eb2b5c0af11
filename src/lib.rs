//! localfire - client-local document store emulation.
//!
//! ## Architecture
//!
//! - `storage` - string-keyed blob backends (memory, directory)
//! - `database` - collection substrate, filters, collection and realtime stores
//! - `sync` - cross-role sync façade and live listener registry
//! - `latency` - injectable simulated network delay
//! - `config` - environment configuration
//! - `utils` - ids, timestamps, ordering helpers

pub mod config;
pub mod database;
pub mod error;
pub mod latency;
pub mod storage;
pub mod sync;
pub mod utils;

pub use config::Config;
pub use database::{
    CollectionStore, Document, Fields, Filter, FilterOp, RealtimeStore, StoreState, Substrate,
};
pub use error::{StorageError, StoreError, SyncError};
pub use latency::{Latency, NoLatency, TokioLatency};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
pub use sync::{DataSyncService, SyncEvent, SyncRole};
