//! Builder for wiring a results cache.

use std::sync::Arc;

use crate::cache::{
    CacheBackend, CacheKeyGenerator, EntryCodec, InMemoryBackend, IntervalKeyGenerator,
    ScopedKeyGenerator,
};
use crate::config::ResultsCacheConfig;
use crate::results::cache::{Clock, ResultsCache};
use crate::results::freshness::FreshnessFilter;
use crate::results::merge::ExtentMerger;
use crate::results::partition::Partitioner;
use crate::traits::{CachePolicy, DefaultCachePolicy, Limits, QueryHandler, StaticLimits};
use crate::types::{Extractor, ResponseMerger, SeriesExtractor, SeriesMerger};
use crate::{CacheError, Result};

/// Builder for [`ResultsCache`].
///
/// Every collaborator is composed here, once, at construction — the
/// orchestrator never reaches into a registry at runtime. Only the
/// downstream handler is mandatory; everything else has a default:
/// in-memory backend, interval key generator wrapped for scoping, static
/// limits, permissive policy, and the sample-based merger/extractor pair.
pub struct ResultsCacheBuilder {
    config: ResultsCacheConfig,
    downstream: Option<Arc<dyn QueryHandler>>,
    backend: Option<Arc<dyn CacheBackend>>,
    key_generator: Option<Arc<dyn CacheKeyGenerator>>,
    limits: Option<Arc<dyn Limits>>,
    policy: Option<Arc<dyn CachePolicy>>,
    merger: Option<Arc<dyn ResponseMerger>>,
    extractor: Option<Arc<dyn Extractor>>,
    clock: Option<Clock>,
}

impl ResultsCacheBuilder {
    pub fn new() -> Self {
        Self {
            config: ResultsCacheConfig::default(),
            downstream: None,
            backend: None,
            key_generator: None,
            limits: None,
            policy: None,
            merger: None,
            extractor: None,
            clock: None,
        }
    }

    /// Use the given configuration instead of the defaults.
    pub fn config(mut self, config: ResultsCacheConfig) -> Self {
        self.config = config;
        self
    }

    /// The query engine invoked to fill misses. Mandatory.
    pub fn downstream(mut self, handler: Arc<dyn QueryHandler>) -> Self {
        self.downstream = Some(handler);
        self
    }

    /// Byte store for entries (default: in-memory, sized per config).
    pub fn backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Key generator (default: interval splitter wrapped for scoping).
    pub fn key_generator(mut self, generator: Arc<dyn CacheKeyGenerator>) -> Self {
        self.key_generator = Some(generator);
        self
    }

    /// Per-tenant limits (default: [`StaticLimits`]).
    pub fn limits(mut self, limits: Arc<dyn Limits>) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Request/response caching policy (default: [`DefaultCachePolicy`]).
    pub fn policy(mut self, policy: Arc<dyn CachePolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Response merger (default: [`SeriesMerger`]).
    pub fn merger(mut self, merger: Arc<dyn ResponseMerger>) -> Self {
        self.merger = Some(merger);
        self
    }

    /// Sub-range extractor (default: [`SeriesExtractor`]).
    pub fn extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Millisecond clock override, for deterministic freshness in tests.
    pub fn clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Validate configuration and assemble the cache.
    pub fn build(self) -> Result<ResultsCache> {
        let compression = self.config.validate()?;

        let downstream = self
            .downstream
            .ok_or_else(|| CacheError::Configuration("no downstream handler".into()))?;

        let backend = self
            .backend
            .unwrap_or_else(|| Arc::new(InMemoryBackend::new(&self.config.backend)));

        let key_generator = self.key_generator.unwrap_or_else(|| {
            Arc::new(ScopedKeyGenerator::new(Arc::new(IntervalKeyGenerator::new(
                self.config.split_interval_ms,
            ))))
        });

        let limits = self.limits.unwrap_or_else(|| Arc::new(StaticLimits::new()));
        let policy = self.policy.unwrap_or_else(|| Arc::new(DefaultCachePolicy));
        let merger: Arc<dyn ResponseMerger> =
            self.merger.unwrap_or_else(|| Arc::new(SeriesMerger));
        let extractor: Arc<dyn Extractor> =
            self.extractor.unwrap_or_else(|| Arc::new(SeriesExtractor));
        let clock = self.clock.unwrap_or_else(|| {
            Arc::new(|| {
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_millis() as i64)
                    .unwrap_or_default()
            })
        });

        Ok(ResultsCache {
            downstream,
            backend,
            key_generator,
            limits,
            policy,
            merger: merger.clone(),
            codec: EntryCodec::new(compression),
            partitioner: Partitioner::new(
                self.config.min_cache_extent_ms,
                self.config.only_use_entire_extent,
                extractor.clone(),
            ),
            extent_merger: ExtentMerger::new(merger),
            freshness: FreshnessFilter::new(extractor),
            clock,
        })
    }
}

impl Default for ResultsCacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}
