//! Configuration module for localfire.
//!
//! Loads configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::database::{DEFAULT_COLLECTION_LATENCY_MS, DEFAULT_REALTIME_LATENCY_MS};
use crate::latency::{Latency, TokioLatency};
use crate::sync::DEFAULT_SYNC_LATENCY_MS;

const DEFAULT_STORAGE_DIR: &str = ".localfire";

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding one file per collection
    pub storage_dir: PathBuf,

    /// Acting identity; reads are empty without one
    pub actor: Option<String>,

    // Simulated latencies
    pub collection_latency: Duration,
    pub realtime_latency: Duration,
    pub sync_latency: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            actor: None,
            collection_latency: Duration::from_millis(DEFAULT_COLLECTION_LATENCY_MS),
            realtime_latency: Duration::from_millis(DEFAULT_REALTIME_LATENCY_MS),
            sync_latency: Duration::from_millis(DEFAULT_SYNC_LATENCY_MS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env`).
    ///
    /// Every variable is optional; malformed values fall back to defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let storage_dir = lookup("LOCALFIRE_STORAGE_DIR")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_dir);

        let actor = lookup("LOCALFIRE_ACTOR")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            storage_dir,
            actor,
            collection_latency: parse_millis(
                &lookup,
                "LOCALFIRE_COLLECTION_LATENCY_MS",
                defaults.collection_latency,
            ),
            realtime_latency: parse_millis(
                &lookup,
                "LOCALFIRE_REALTIME_LATENCY_MS",
                defaults.realtime_latency,
            ),
            sync_latency: parse_millis(&lookup, "LOCALFIRE_SYNC_LATENCY_MS", defaults.sync_latency),
        }
    }

    pub fn collection_latency(&self) -> Arc<dyn Latency> {
        Arc::new(TokioLatency::new(self.collection_latency))
    }

    pub fn realtime_latency(&self) -> Arc<dyn Latency> {
        Arc::new(TokioLatency::new(self.realtime_latency))
    }

    pub fn sync_latency(&self) -> Arc<dyn Latency> {
        Arc::new(TokioLatency::new(self.sync_latency))
    }
}

fn parse_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Duration {
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!("Ignoring invalid {}={:?}, using {:?}", key, raw, default);
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.collection_latency, Duration::from_millis(500));
        assert_eq!(config.realtime_latency, Duration::from_millis(100));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("LOCALFIRE_STORAGE_DIR", "/tmp/lf"),
            ("LOCALFIRE_ACTOR", " u1 "),
            ("LOCALFIRE_SYNC_LATENCY_MS", "0"),
        ]));
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/lf"));
        assert_eq!(config.actor.as_deref(), Some("u1"));
        assert_eq!(config.sync_latency, Duration::ZERO);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("LOCALFIRE_COLLECTION_LATENCY_MS", "soon"),
            ("LOCALFIRE_ACTOR", "   "),
        ]));
        assert_eq!(config.collection_latency, Duration::from_millis(500));
        assert_eq!(config.actor, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_factories_use_configured_delay() {
        let config = Config::from_lookup(lookup(&[("LOCALFIRE_SYNC_LATENCY_MS", "40")]));
        let start = tokio::time::Instant::now();
        config.sync_latency().wait().await;
        assert!(start.elapsed() >= Duration::from_millis(40));
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
