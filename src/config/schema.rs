//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a selector.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so a bare `SelectorConfig::default()` is usable.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for a service selector.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Service type this selector picks for. Namespaces the cache key so
    /// independent selectors never read each other's cached choice.
    pub service_name: String,

    /// Only endpoints in this list may be picked. `None` means no restriction.
    pub whitelist: Option<Vec<String>>,

    /// Health probe settings.
    pub probe: ProbeConfig,

    /// Round and quarantine settings.
    pub selection: SelectionConfig,

    /// Cached-selection settings.
    pub cache: CacheConfig,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            service_name: "discovery-provider".to_string(),
            whitelist: None,
            probe: ProbeConfig::default(),
            selection: SelectionConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

/// Health probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Per-probe deadline in milliseconds. No outcome is reported after it.
    pub request_timeout_ms: u64,

    /// Path probed on every candidate.
    pub health_check_path: String,

    /// Delay between consecutive probe launches within a round, in
    /// milliseconds. Zero fires the whole round at once.
    pub spacing_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
            health_check_path: "/health_check".to_string(),
            spacing_ms: 0,
        }
    }
}

impl ProbeConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn spacing(&self) -> Duration {
        Duration::from_millis(self.spacing_ms)
    }
}

/// Round and quarantine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Maximum probes in flight at once; also the round sample size.
    pub max_concurrent_requests: usize,

    /// How long an unhealthy candidate stays out of rotation, in milliseconds.
    pub unhealthy_ttl_ms: u64,

    /// How long a backup entry stays usable, in milliseconds.
    pub backups_ttl_ms: u64,

    /// Largest block difference a candidate may report and still be healthy.
    pub unhealthy_block_diff: u64,

    /// How long the relaxed acceptance bar stays active after a backup
    /// fallback, in milliseconds.
    pub regressed_mode_timeout_ms: u64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 6,
            unhealthy_ttl_ms: 60 * 60 * 1000,
            backups_ttl_ms: 2 * 60 * 1000,
            unhealthy_block_diff: 15,
            regressed_mode_timeout_ms: 2 * 60 * 1000,
        }
    }
}

impl SelectionConfig {
    pub fn unhealthy_ttl(&self) -> Duration {
        Duration::from_millis(self.unhealthy_ttl_ms)
    }

    pub fn backups_ttl(&self) -> Duration {
        Duration::from_millis(self.backups_ttl_ms)
    }

    pub fn regressed_mode_timeout(&self) -> Duration {
        Duration::from_millis(self.regressed_mode_timeout_ms)
    }
}

/// Cached-selection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Age under which a cached selection is returned without probing,
    /// in milliseconds.
    pub reselect_timeout_ms: u64,

    /// Interval at which the freshness monitor re-validates the cached
    /// candidate, in milliseconds.
    pub timestamp_interval_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            reselect_timeout_ms: 60 * 1000,
            timestamp_interval_ms: 5_000,
        }
    }
}

impl CacheConfig {
    pub fn reselect_timeout(&self) -> Duration {
        Duration::from_millis(self.reselect_timeout_ms)
    }

    pub fn timestamp_interval(&self) -> Duration {
        Duration::from_millis(self.timestamp_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = SelectorConfig::default();
        assert_eq!(config.selection.max_concurrent_requests, 6);
        assert_eq!(config.probe.request_timeout_ms, 30_000);
        assert_eq!(config.selection.unhealthy_ttl_ms, 3_600_000);
        assert_eq!(config.selection.backups_ttl_ms, 120_000);
        assert_eq!(config.cache.reselect_timeout_ms, 60_000);
        assert_eq!(config.cache.timestamp_interval_ms, 5_000);
        assert_eq!(config.selection.unhealthy_block_diff, 15);
        assert_eq!(config.probe.health_check_path, "/health_check");
        assert!(config.whitelist.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SelectorConfig = toml::from_str(
            r#"
            service_name = "creator-node"

            [selection]
            max_concurrent_requests = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.service_name, "creator-node");
        assert_eq!(config.selection.max_concurrent_requests, 3);
        assert_eq!(config.selection.unhealthy_block_diff, 15);
        assert_eq!(config.probe.request_timeout_ms, 30_000);
    }
}
