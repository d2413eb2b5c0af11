#![allow(dead_code)]

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::BoxFuture;
use localfire::{KeyValueStore, Latency, MemoryStorage, NoLatency, StorageError, Substrate};
use tokio::sync::Semaphore;

/// Latency that blocks until the test releases it.
#[derive(Clone)]
pub struct GatedLatency {
    gate: Arc<Semaphore>,
}

impl GatedLatency {
    pub fn new() -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
        }
    }

    /// Let `n` pending (or future) waits through.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }
}

impl Latency for GatedLatency {
    fn wait(&self) -> BoxFuture<'_, ()> {
        let gate = Arc::clone(&self.gate);
        Box::pin(async move {
            gate.acquire().await.expect("gate closed").forget();
        })
    }
}

pub fn no_latency() -> Arc<dyn Latency> {
    Arc::new(NoLatency)
}

pub fn memory_substrate() -> (MemoryStorage, Substrate) {
    let storage = MemoryStorage::new();
    let substrate = Substrate::from_backend(storage.clone());
    (storage, substrate)
}

/// Memory backend whose writes can be switched to fail.
#[derive(Clone, Default)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    failing: Arc<AtomicBool>,
}

impl FlakyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::StorageFull,
                "disk full",
            )));
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<bool, StorageError> {
        self.check()?;
        self.inner.remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.inner.keys()
    }
}

pub fn flaky_substrate() -> (FlakyStorage, Substrate) {
    let storage = FlakyStorage::new();
    let substrate = Substrate::from_backend(storage.clone());
    (storage, substrate)
}
