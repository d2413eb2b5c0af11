//! Sync module - simulated cross-role propagation.
//!
//! ## Architecture
//!
//! - `DataSyncService` - shared façade recording patient/doctor/lab syncs
//! - `ListenerRegistry` - at most one live listener per (role, owner)
//! - `SyncTransport` - delivery seam; `SimulatedTransport` only waits

mod registry;
mod service;
mod transport;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use registry::ListenerRegistry;
pub use service::{DataSyncService, SyncEvent, DEFAULT_SYNC_LATENCY_MS};
pub use transport::{SimulatedTransport, SyncTransport};

/// Logical actor a sync is addressed to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum SyncRole {
    Patient,
    Doctor,
    Lab,
}

impl SyncRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::Lab => "lab",
        }
    }
}

impl fmt::Display for SyncRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
