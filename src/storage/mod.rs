//! Storage module - string-keyed blob backends.
//!
//! This is the durable medium underneath the document substrate. A backend
//! only knows about opaque string values under string keys; collection
//! encoding lives in [`crate::database::Substrate`].
//!
//! ## Backends
//!
//! - `MemoryStorage` - concurrent in-process map, lost on drop
//! - `FileStorage` - one file per key inside a directory
//!
//! ## Usage
//!
//! ```rust
//! use localfire::storage::{KeyValueStore, MemoryStorage};
//!
//! let storage = MemoryStorage::new();
//! storage.set_item("greeting", "hello").unwrap();
//! assert_eq!(storage.get_item("greeting").unwrap().as_deref(), Some("hello"));
//! ```

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::StorageError;

/// Synchronous string-keyed blob store.
///
/// Calls never suspend; implementations must be safe to share across tasks.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` when absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Returns `true` if a value was removed.
    fn remove_item(&self, key: &str) -> Result<bool, StorageError>;

    /// All keys currently stored, in no particular order.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}
