//! Results cache configuration.
//!
//! Plain serde-deserializable structs; the host application owns loading
//! and layering. [`ResultsCacheConfig::validate`] must pass before serving
//! traffic — an unsupported compression codec or a non-positive interval
//! is a fatal startup error, not a runtime fallback.

use std::time::Duration;

use serde::Deserialize;

use crate::cache::Compression;
use crate::{CacheError, Result};

/// Results cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultsCacheConfig {
    /// Width of one cache-key time bucket in milliseconds (default: 24h).
    /// Bounds entry churn to one entry per bucket per (tenant, query, step).
    #[serde(default = "default_split_interval_ms")]
    pub split_interval_ms: i64,

    /// Extents narrower than this are ignored when partitioning requests
    /// wider than it, so large queries are not fragmented into many tiny
    /// downstream calls (default: 5m). Instant queries are exempt.
    #[serde(default = "default_min_cache_extent_ms")]
    pub min_cache_extent_ms: i64,

    /// Use a cached extent only when it lies fully inside the requested
    /// range. Required when the response shape cannot be sub-range
    /// extracted (default: false).
    #[serde(default)]
    pub only_use_entire_extent: bool,

    /// Compression applied to stored entries: "none" or "snappy"
    /// (default: "none").
    #[serde(default = "default_compression")]
    pub compression: String,

    /// Settings for the bundled in-memory backend.
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Default for ResultsCacheConfig {
    fn default() -> Self {
        Self {
            split_interval_ms: default_split_interval_ms(),
            min_cache_extent_ms: default_min_cache_extent_ms(),
            only_use_entire_extent: false,
            compression: default_compression(),
            backend: BackendConfig::default(),
        }
    }
}

impl ResultsCacheConfig {
    /// Validate the configuration and resolve the compression codec.
    pub fn validate(&self) -> Result<Compression> {
        if self.split_interval_ms <= 0 {
            return Err(CacheError::Configuration(format!(
                "split_interval_ms must be positive, got {}",
                self.split_interval_ms
            )));
        }
        if self.min_cache_extent_ms < 0 {
            return Err(CacheError::Configuration(format!(
                "min_cache_extent_ms must be non-negative, got {}",
                self.min_cache_extent_ms
            )));
        }
        self.compression.parse()
    }
}

fn default_split_interval_ms() -> i64 {
    24 * 60 * 60 * 1000
}

fn default_min_cache_extent_ms() -> i64 {
    5 * 60 * 1000
}

fn default_compression() -> String {
    "none".to_string()
}

/// In-memory backend settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Maximum number of entries (default: 10,000).
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
    /// Time-to-live for entries in seconds (default: 1 hour).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl BackendConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_max_entries() -> u64 {
    10_000
}

fn default_ttl_secs() -> u64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = ResultsCacheConfig::default();
        assert_eq!(config.validate().unwrap(), Compression::None);
    }

    #[test]
    fn snappy_resolves() {
        let config = ResultsCacheConfig {
            compression: "snappy".into(),
            ..ResultsCacheConfig::default()
        };
        assert_eq!(config.validate().unwrap(), Compression::Snappy);
    }

    #[test]
    fn unknown_codec_is_fatal() {
        let config = ResultsCacheConfig {
            compression: "zstd".into(),
            ..ResultsCacheConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CacheError::Configuration(_))
        ));
    }

    #[test]
    fn non_positive_interval_is_fatal() {
        let config = ResultsCacheConfig {
            split_interval_ms: 0,
            ..ResultsCacheConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ResultsCacheConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.split_interval_ms, 24 * 60 * 60 * 1000);
        assert_eq!(config.compression, "none");
        assert_eq!(config.backend.max_entries, 10_000);
    }
}
