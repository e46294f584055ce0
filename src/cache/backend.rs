//! Byte-cache backend trait and the bundled in-memory implementation.

use async_trait::async_trait;
use moka::future::Cache;

use crate::config::BackendConfig;
use crate::Result;

/// The byte store behind the results cache.
///
/// Keys passed in are already generated and bounded in size and charset by
/// the key generator. `fetch` is infallible at this interface: a backend
/// that cannot be reached returns nothing found, and the caller falls
/// through to a full miss. Store failures are surfaced so the caller can
/// log and swallow them.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Look up `keys`, returning the subset that was found and their
    /// values, positionally aligned.
    async fn fetch(&self, keys: &[String]) -> (Vec<String>, Vec<Vec<u8>>);

    /// Write `values` under `keys`, positionally aligned. Last writer wins.
    async fn store(&self, keys: Vec<String>, values: Vec<Vec<u8>>) -> Result<()>;
}

/// Thread-safe in-memory backend on a bounded LRU + TTL cache (moka).
///
/// Suitable for embedded single-process use and tests. Capacity and TTL
/// come from [`BackendConfig`]; eviction beyond that is moka's concern.
pub struct InMemoryBackend {
    entries: Cache<String, Vec<u8>>,
}

impl InMemoryBackend {
    /// Create a backend with the given capacity and TTL settings.
    pub fn new(config: &BackendConfig) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl())
            .build();
        Self { entries }
    }

    /// Number of entries currently held.
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Whether the backend holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new(&BackendConfig::default())
    }
}

#[async_trait]
impl CacheBackend for InMemoryBackend {
    async fn fetch(&self, keys: &[String]) -> (Vec<String>, Vec<Vec<u8>>) {
        let mut found = Vec::new();
        let mut values = Vec::new();
        for key in keys {
            if let Some(value) = self.entries.get(key).await {
                found.push(key.clone());
                values.push(value);
            }
        }
        (found, values)
    }

    async fn store(&self, keys: Vec<String>, values: Vec<Vec<u8>>) -> Result<()> {
        for (key, value) in keys.into_iter().zip(values) {
            self.entries.insert(key, value).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_then_fetch() {
        let backend = InMemoryBackend::default();
        backend
            .store(vec!["a".into()], vec![b"payload".to_vec()])
            .await
            .unwrap();

        let (found, values) = backend.fetch(&["a".into(), "b".into()]).await;
        assert_eq!(found, vec!["a".to_string()]);
        assert_eq!(values, vec![b"payload".to_vec()]);
    }

    #[tokio::test]
    async fn fetch_missing_is_empty() {
        let backend = InMemoryBackend::default();
        let (found, values) = backend.fetch(&["absent".into()]).await;
        assert!(found.is_empty());
        assert!(values.is_empty());
    }

    #[tokio::test]
    async fn ttl_expires_entries() {
        let config = BackendConfig {
            max_entries: 10,
            ttl_secs: 1,
        };
        let backend = InMemoryBackend::new(&config);
        backend
            .store(vec!["a".into()], vec![b"v".to_vec()])
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

        let (found, _) = backend.fetch(&["a".into()]).await;
        assert!(found.is_empty());
    }
}
