//! Data sync façade.
//!
//! One instance is built at startup and shared through `Arc`; it records
//! every cross-role sync and owns the live listener registry.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, error, info};

use super::{ListenerRegistry, SimulatedTransport, SyncRole, SyncTransport};
use crate::database::StoreState;
use crate::error::{SyncError, SyncResult};
use crate::latency::TokioLatency;
use crate::utils::now_iso;

/// Default simulated round trip of one sync.
pub const DEFAULT_SYNC_LATENCY_MS: u64 = 300;

/// Record of one completed sync.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncEvent {
    pub role: SyncRole,
    pub owner_id: String,
    pub data_type: String,
    pub payload: Value,
    pub synced_at: String,
}

/// Cross-role synchronization façade.
pub struct DataSyncService {
    transport: Arc<dyn SyncTransport>,
    history: Mutex<Vec<SyncEvent>>,
    listeners: ListenerRegistry,
}

impl DataSyncService {
    pub fn new(transport: Arc<dyn SyncTransport>) -> Self {
        info!("Data sync service initialized");
        Self {
            transport,
            history: Mutex::new(Vec::new()),
            listeners: ListenerRegistry::new(),
        }
    }

    /// Service over a [`SimulatedTransport`] with the default latency.
    pub fn simulated() -> Self {
        Self::new(Arc::new(SimulatedTransport::new(Arc::new(
            TokioLatency::from_millis(DEFAULT_SYNC_LATENCY_MS),
        ))))
    }

    pub async fn sync_patient_data(
        &self,
        patient_id: &str,
        data_type: &str,
        payload: Value,
    ) -> SyncResult<SyncEvent> {
        self.sync(SyncRole::Patient, patient_id, data_type, payload)
            .await
    }

    pub async fn sync_doctor_data(
        &self,
        doctor_id: &str,
        data_type: &str,
        payload: Value,
    ) -> SyncResult<SyncEvent> {
        self.sync(SyncRole::Doctor, doctor_id, data_type, payload)
            .await
    }

    pub async fn sync_lab_data(
        &self,
        lab_id: &str,
        data_type: &str,
        payload: Value,
    ) -> SyncResult<SyncEvent> {
        self.sync(SyncRole::Lab, lab_id, data_type, payload).await
    }

    /// Reflect an appointment to both participants, patient first.
    ///
    /// If the doctor side fails the patient side stays recorded; nothing is
    /// rolled back.
    pub async fn sync_appointment(
        &self,
        patient_id: &str,
        doctor_id: &str,
        payload: Value,
    ) -> SyncResult<(SyncEvent, SyncEvent)> {
        let patient = self
            .sync_patient_data(patient_id, "appointment", payload.clone())
            .await?;
        let doctor = self
            .sync_doctor_data(doctor_id, "appointment", payload)
            .await?;
        Ok((patient, doctor))
    }

    /// Deliver one sync and record it.
    pub async fn sync(
        &self,
        role: SyncRole,
        owner_id: &str,
        data_type: &str,
        payload: Value,
    ) -> SyncResult<SyncEvent> {
        if owner_id.trim().is_empty() {
            let err = SyncError::InvalidTarget(format!("empty {role} id"));
            error!("Sync rejected: {}", err);
            return Err(err);
        }

        let event = SyncEvent {
            role,
            owner_id: owner_id.to_string(),
            data_type: data_type.to_string(),
            payload,
            synced_at: now_iso(),
        };

        if let Err(e) = self.transport.deliver(&event).await {
            error!("Error syncing {} data for {}: {}", role, owner_id, e);
            return Err(e);
        }

        debug!("Synced {} {} data for {}", data_type, role, owner_id);
        self.history.lock().push(event.clone());
        Ok(event)
    }

    /// Every sync recorded so far, oldest first.
    pub fn history(&self) -> Vec<SyncEvent> {
        self.history.lock().clone()
    }

    /// Install an unsubscribe callback for `(role, owner)`, replacing (and
    /// invoking) any previous one.
    pub fn register_listener<F>(&self, role: SyncRole, owner_id: &str, unsubscribe: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.listeners.register(role, owner_id, unsubscribe);
    }

    pub fn unregister_listener(&self, role: SyncRole, owner_id: &str) -> bool {
        self.listeners.unregister(role, owner_id)
    }

    /// Forward every state change of a store to `on_change` until the
    /// listener is replaced, unregistered or cleaned up.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn enable_live_sync<F>(
        &self,
        role: SyncRole,
        owner_id: &str,
        mut updates: watch::Receiver<StoreState>,
        on_change: F,
    ) where
        F: Fn(StoreState) + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let state = updates.borrow_and_update().clone();
                on_change(state);
            }
        });

        self.listeners
            .register(role, owner_id, move || handle.abort());
        info!("Live sync enabled for {} {}", role, owner_id);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn has_listener(&self, role: SyncRole, owner_id: &str) -> bool {
        self.listeners.contains(role, owner_id)
    }

    /// Unsubscribe every live listener. Returns how many were removed.
    pub fn cleanup(&self) -> usize {
        self.listeners.cleanup()
    }
}

impl std::fmt::Debug for DataSyncService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSyncService")
            .field("history_len", &self.history.lock().len())
            .field("listeners", &self.listeners)
            .finish()
    }
}
