//! Live listener registry.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

use super::SyncRole;

type Unsubscribe = Box<dyn FnOnce() + Send>;

/// Registry of unsubscribe callbacks keyed by `(role, owner)`.
///
/// Holds at most one listener per key. Remaining callbacks are invoked when
/// the registry is dropped.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Mutex<HashMap<(SyncRole, String), Unsubscribe>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `unsubscribe` for `(role, owner)`.
    ///
    /// A listener already registered under the same key is unsubscribed
    /// first.
    pub fn register<F>(&self, role: SyncRole, owner_id: &str, unsubscribe: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let key = (role, owner_id.to_string());

        // Swap under one lock; the replaced callback runs after release.
        let previous = self.listeners.lock().insert(key, Box::new(unsubscribe));
        if let Some(previous) = previous {
            debug!("Replacing {} listener for {}", role, owner_id);
            previous();
        }
        debug!("Registered {} listener for {}", role, owner_id);
    }

    /// Unsubscribe one listener. Returns `true` if one was registered.
    pub fn unregister(&self, role: SyncRole, owner_id: &str) -> bool {
        let removed = self.listeners.lock().remove(&(role, owner_id.to_string()));
        match removed {
            Some(unsubscribe) => {
                unsubscribe();
                true
            }
            None => false,
        }
    }

    /// Unsubscribe and forget every listener.
    pub fn cleanup(&self) -> usize {
        let drained: Vec<_> = self.listeners.lock().drain().collect();
        let count = drained.len();
        for (_, unsubscribe) in drained {
            unsubscribe();
        }
        if count > 0 {
            debug!("Cleaned up {} listeners", count);
        }
        count
    }

    pub fn contains(&self, role: SyncRole, owner_id: &str) -> bool {
        self.listeners
            .lock()
            .contains_key(&(role, owner_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }
}

impl Drop for ListenerRegistry {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.lock();
        f.debug_struct("ListenerRegistry")
            .field("listener_count", &listeners.len())
            .field("keys", &listeners.keys().collect::<Vec<_>>())
            .finish()
    }
}
