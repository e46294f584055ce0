//! Core downstream and policy traits

use std::time::Duration;

use async_trait::async_trait;

use crate::types::{QueryRequest, QueryResponse};
use crate::Result;

/// The query execution backend invoked to fill cache misses.
///
/// This trait abstracts over the actual query engine, allowing the results
/// cache to be layered in front of any time-ranged execution path without
/// coupling to its transport. Implementations may retry or back off
/// internally; the cache layer itself never retries.
#[async_trait]
pub trait QueryHandler: Send + Sync {
    async fn do_request(&self, tenant: &str, request: &QueryRequest) -> Result<QueryResponse>;
}

/// Per-tenant operational limits.
pub trait Limits: Send + Sync {
    /// The most recent span of time excluded from caching for this tenant,
    /// because the underlying data may still be revised upstream.
    fn max_cache_freshness(&self, tenant: &str) -> Duration;

    /// Concurrency bound for fan-out of missing sub-requests.
    fn query_parallelism(&self, tenant: &str, request: &QueryRequest) -> usize;
}

/// Fixed limits applied to every tenant.
#[derive(Debug, Clone)]
pub struct StaticLimits {
    max_cache_freshness: Duration,
    query_parallelism: usize,
}

impl StaticLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the freshness window (default: 10 minutes).
    pub fn with_max_cache_freshness(mut self, freshness: Duration) -> Self {
        self.max_cache_freshness = freshness;
        self
    }

    /// Set the sub-request concurrency bound (default: 14).
    pub fn with_query_parallelism(mut self, parallelism: usize) -> Self {
        self.query_parallelism = parallelism;
        self
    }
}

impl Default for StaticLimits {
    fn default() -> Self {
        Self {
            max_cache_freshness: Duration::from_secs(10 * 60),
            query_parallelism: 14,
        }
    }
}

impl Limits for StaticLimits {
    fn max_cache_freshness(&self, _tenant: &str) -> Duration {
        self.max_cache_freshness
    }

    fn query_parallelism(&self, _tenant: &str, _request: &QueryRequest) -> usize {
        self.query_parallelism
    }
}

/// Decides which requests and responses are allowed into the cache.
pub trait CachePolicy: Send + Sync {
    /// Whether this request should interact with the cache at all.
    /// Declining routes the call straight to the downstream handler.
    fn should_cache_request(&self, request: &QueryRequest) -> bool {
        !request.options.no_cache
    }

    /// Whether a freshly fetched response may be persisted. Called per
    /// successful sub-request before conversion to a candidate extent;
    /// rejecting keeps partial or degenerate responses out of the cache
    /// without affecting what the caller receives.
    fn should_cache_response(
        &self,
        _request: &QueryRequest,
        _response: &QueryResponse,
        _max_cache_time: i64,
    ) -> bool {
        true
    }
}

/// The default policy: honor the request's `no_cache` flag, persist every
/// successful response.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCachePolicy;

impl CachePolicy for DefaultCachePolicy {}
