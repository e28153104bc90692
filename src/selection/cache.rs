//! Cached selection persistence and freshness.
//!
//! # Responsibilities
//! - Remember the last good selection across calls (and, with a durable
//!   store, across process restarts)
//! - Keep the cached choice honest with a background freshness monitor
//!
//! # Design Decisions
//! - Values are serialized as JSON text so any key-value store can hold them
//! - Freshness uses wall-clock milliseconds; entries survive restarts
//! - A corrupt cache entry is treated as a miss and evicted, never an error
//!   surfaced to the caller

use crate::error::SelectorError;
use crate::probe::HealthProber;
use crate::source::Candidate;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::broadcast;
use tokio::time;

/// Fixed, namespaced cache key for one service type.
pub fn cache_key(service_name: &str) -> String {
    format!("selector:{service_name}:selection")
}

/// Milliseconds since the Unix epoch.
pub(crate) fn unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// A previously selected endpoint with its selection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedSelection {
    pub candidate: Candidate,
    /// Milliseconds since the Unix epoch at selection time.
    pub selected_at_ms: u64,
}

impl CachedSelection {
    pub fn now(candidate: Candidate) -> Self {
        Self {
            candidate,
            selected_at_ms: unix_ms(),
        }
    }

    pub fn age(&self, now_ms: u64) -> Duration {
        Duration::from_millis(now_ms.saturating_sub(self.selected_at_ms))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Durable key-value store for the last good selection.
///
/// Implementations back this with whatever the host application persists
/// to; values are opaque text.
#[async_trait]
pub trait SelectionCache: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>, SelectorError>;
    async fn write(&self, key: &str, value: &str) -> Result<(), SelectorError>;
    async fn evict(&self, key: &str) -> Result<(), SelectorError>;
}

/// In-process cache, for tests and callers without durable storage.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SelectionCache for MemoryCache {
    async fn read(&self, key: &str) -> Result<Option<String>, SelectorError> {
        Ok(self
            .entries
            .lock()
            .expect("cache lock poisoned")
            .get(key)
            .cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), SelectorError> {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn evict(&self, key: &str) -> Result<(), SelectorError> {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .remove(key);
        Ok(())
    }
}

/// Background task that re-validates the cached candidate on a fixed
/// interval and evicts the entry once the candidate goes unhealthy.
pub struct FreshnessMonitor {
    cache: Arc<dyn SelectionCache>,
    prober: HealthProber,
    key: String,
    interval: Duration,
}

impl FreshnessMonitor {
    pub fn new(
        cache: Arc<dyn SelectionCache>,
        prober: HealthProber,
        key: String,
        interval: Duration,
    ) -> Self {
        Self {
            cache,
            prober,
            key,
            interval,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            key = %self.key,
            interval_ms = self.interval.as_millis() as u64,
            "freshness monitor starting"
        );

        let mut ticker = time::interval(self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_once().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("freshness monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    async fn check_once(&self) {
        let raw = match self.cache.read(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "freshness check could not read cache");
                return;
            }
        };

        let cached = match CachedSelection::from_json(&raw) {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(error = %e, "evicting unreadable cached selection");
                let _ = self.cache.evict(&self.key).await;
                return;
            }
        };

        let outcome = self.prober.probe(&cached.candidate).await;
        if !outcome.is_ok() {
            tracing::warn!(
                candidate = %cached.candidate,
                "cached selection went unhealthy, evicting"
            );
            if let Err(e) = self.cache.evict(&self.key).await {
                tracing::warn!(error = %e, "failed to evict stale selection");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_namespaced_per_service() {
        assert_eq!(
            cache_key("discovery-provider"),
            "selector:discovery-provider:selection"
        );
        assert_ne!(cache_key("discovery-provider"), cache_key("creator-node"));
    }

    #[test]
    fn test_cached_selection_round_trips_as_text() {
        let entry = CachedSelection {
            candidate: Candidate::parse("https://node.example.com").unwrap(),
            selected_at_ms: 1_700_000_000_000,
        };
        let raw = entry.to_json().unwrap();
        assert_eq!(CachedSelection::from_json(&raw).unwrap(), entry);
    }

    #[test]
    fn test_age_saturates_on_clock_skew() {
        let entry = CachedSelection {
            candidate: Candidate::parse("https://node.example.com").unwrap(),
            selected_at_ms: 2_000,
        };
        assert_eq!(entry.age(1_000), Duration::ZERO);
        assert_eq!(entry.age(3_500), Duration::from_millis(1_500));
    }

    #[tokio::test]
    async fn test_memory_cache_read_write_evict() {
        let cache = MemoryCache::new();
        assert_eq!(cache.read("k").await.unwrap(), None);

        cache.write("k", "v").await.unwrap();
        assert_eq!(cache.read("k").await.unwrap(), Some("v".to_string()));

        cache.evict("k").await.unwrap();
        assert_eq!(cache.read("k").await.unwrap(), None);
    }
}
