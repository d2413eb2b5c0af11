//! Error types shared by the storage, database and sync layers.

use thiserror::Error;

use crate::sync::SyncRole;

/// Failures raised by a key-value backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid storage key `{0}`")]
    InvalidKey(String),
}

/// Failures surfaced by the collection and realtime stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Target document does not exist in the persisted collection.
    #[error("document not found: {0}")]
    NotFound(String),

    /// Owner-scoped operation attempted without an identity.
    #[error("no authenticated user")]
    Unauthenticated,

    #[error("failed to encode collection `{collection}`: {source}")]
    Encode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write collection `{collection}`: {source}")]
    Storage {
        collection: String,
        #[source]
        source: StorageError,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Failures surfaced by the synchronization façade.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("{role} sync for `{owner_id}` failed: {reason}")]
    Transport {
        role: SyncRole,
        owner_id: String,
        reason: String,
    },

    #[error("invalid sync target: {0}")]
    InvalidTarget(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type SyncResult<T> = Result<T, SyncError>;
