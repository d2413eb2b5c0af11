//! Simulated network latency.
//!
//! Every component that models a round trip awaits a [`Latency`] instead of
//! sleeping directly, so tests can swap in [`NoLatency`] or a gated double.

use std::time::Duration;

use futures::future::{self, BoxFuture};

/// Source of artificial delay.
pub trait Latency: Send + Sync {
    /// Resolve after the delay this latency models.
    fn wait(&self) -> BoxFuture<'_, ()>;
}

/// Sleeps on the tokio timer for a fixed duration.
#[derive(Debug, Clone, Copy)]
pub struct TokioLatency {
    delay: Duration,
}

impl TokioLatency {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }
}

impl Latency for TokioLatency {
    fn wait(&self) -> BoxFuture<'_, ()> {
        let delay = self.delay;
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        })
    }
}

/// Resolves immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLatency;

impl Latency for NoLatency {
    fn wait(&self) -> BoxFuture<'_, ()> {
        Box::pin(future::ready(()))
    }
}
