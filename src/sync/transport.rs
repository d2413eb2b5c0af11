//! Sync delivery seam.

use std::sync::Arc;

use futures::future::BoxFuture;

use super::SyncEvent;
use crate::error::SyncResult;
use crate::latency::Latency;

/// Delivers one sync event to the other side.
pub trait SyncTransport: Send + Sync {
    fn deliver<'a>(&'a self, event: &'a SyncEvent) -> BoxFuture<'a, SyncResult<()>>;
}

/// Transport that models a round trip by waiting, then always succeeds.
pub struct SimulatedTransport {
    latency: Arc<dyn Latency>,
}

impl SimulatedTransport {
    pub fn new(latency: Arc<dyn Latency>) -> Self {
        Self { latency }
    }
}

impl SyncTransport for SimulatedTransport {
    fn deliver<'a>(&'a self, _event: &'a SyncEvent) -> BoxFuture<'a, SyncResult<()>> {
        Box::pin(async move {
            self.latency.wait().await;
            Ok(())
        })
    }
}
