//! Collection substrate over a key-value backend.
//!
//! Each logical collection is one JSON array stored under `mock_<name>`.
//! There is no append mode: writers load the whole collection, transform it
//! and save it back.

use std::sync::Arc;

use tracing::{debug, error, warn};

use super::models::Document;
use crate::error::{StoreError, StoreResult};
use crate::storage::KeyValueStore;

/// Prefix of every collection key.
pub const KEY_PREFIX: &str = "mock_";

/// Backend key holding collection `name`.
pub fn key_for(name: &str) -> String {
    format!("{KEY_PREFIX}{name}")
}

/// Load/save helpers for whole collections.
#[derive(Clone)]
pub struct Substrate {
    backend: Arc<dyn KeyValueStore>,
}

impl Substrate {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Wrap a concrete backend.
    pub fn from_backend<S: KeyValueStore + 'static>(backend: S) -> Self {
        Self::new(Arc::new(backend))
    }

    /// Load a collection.
    ///
    /// Missing, unreadable or undecodable data is logged and reads as an
    /// empty collection.
    pub fn load(&self, name: &str) -> Vec<Document> {
        let key = key_for(name);
        let raw = match self.backend.get_item(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read collection {}: {}", name, e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Document>>(&raw) {
            Ok(docs) => {
                debug!("Loaded {} documents from {}", docs.len(), name);
                docs
            }
            Err(e) => {
                warn!("Discarding undecodable collection {}: {}", name, e);
                Vec::new()
            }
        }
    }

    /// Overwrite a collection with `docs`.
    ///
    /// Failures are logged and returned so callers can keep the in-memory
    /// copy unchanged.
    pub fn save(&self, name: &str, docs: &[Document]) -> StoreResult<()> {
        let encoded = serde_json::to_string(docs).map_err(|source| {
            error!("Failed to encode collection {}: {}", name, source);
            StoreError::Encode {
                collection: name.to_string(),
                source,
            }
        })?;

        self.backend
            .set_item(&key_for(name), &encoded)
            .map_err(|source| {
                error!("Failed to write collection {}: {}", name, source);
                StoreError::Storage {
                    collection: name.to_string(),
                    source,
                }
            })?;

        debug!("Saved {} documents to {}", docs.len(), name);
        Ok(())
    }

    /// Drop a whole collection.
    pub fn clear(&self, name: &str) -> StoreResult<bool> {
        self.backend
            .remove_item(&key_for(name))
            .map_err(|source| StoreError::Storage {
                collection: name.to_string(),
                source,
            })
    }

    /// Names of every collection present in the backend, sorted.
    pub fn collections(&self) -> Vec<String> {
        let mut names: Vec<String> = match self.backend.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter_map(|k| k.strip_prefix(KEY_PREFIX).map(str::to_string))
                .collect(),
            Err(e) => {
                warn!("Failed to list collections: {}", e);
                Vec::new()
            }
        };
        names.sort();
        names
    }
}

impl std::fmt::Debug for Substrate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Substrate").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::fields;
    use crate::storage::MemoryStorage;
    use serde_json::json;

    #[test]
    fn test_key_format() {
        assert_eq!(key_for("chat_messages"), "mock_chat_messages");
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let substrate = Substrate::from_backend(MemoryStorage::new());
        let docs = vec![
            Document::new("b", fields(json!({"n": 1}))),
            Document::new("a", fields(json!({"n": 2}))),
        ];
        substrate.save("things", &docs).unwrap();
        assert_eq!(substrate.load("things"), docs);
    }

    #[test]
    fn test_missing_and_corrupt_read_empty() {
        let storage = MemoryStorage::new();
        storage.set_item("mock_broken", "{not json").unwrap();
        storage.set_item("unrelated", "[]").unwrap();

        let substrate = Substrate::from_backend(storage);
        assert!(substrate.load("nothing_here").is_empty());
        assert!(substrate.load("broken").is_empty());
        assert_eq!(substrate.collections(), vec!["broken".to_string()]);
    }

    #[test]
    fn test_clear_drops_one_collection() {
        let substrate = Substrate::from_backend(MemoryStorage::new());
        substrate.save("keep", &[Document::new("k", fields(json!({})))]).unwrap();
        substrate.save("gone", &[Document::new("g", fields(json!({})))]).unwrap();

        assert!(substrate.clear("gone").unwrap());
        assert!(!substrate.clear("gone").unwrap());
        assert!(substrate.load("gone").is_empty());
        assert_eq!(substrate.collections(), vec!["keep".to_string()]);
    }
}
