//! Cache key generation.

use std::sync::Arc;

use crate::types::QueryRequest;

/// Maps (tenant, request) to the entry key. Must be pure and
/// deterministic: two calls with equal inputs produce equal keys.
pub trait CacheKeyGenerator: Send + Sync {
    fn generate(&self, tenant: &str, request: &QueryRequest) -> String;
}

/// Constant-interval splitter.
///
/// `bucket = floor(start / interval)`; the key is
/// `tenant:query:step:bucket`. One entry per interval-sized window per
/// (tenant, query, step) bounds entry churn: requests sliding forward
/// within a window keep rewriting the same entry instead of fanning out
/// new keys.
#[derive(Debug, Clone, Copy)]
pub struct IntervalKeyGenerator {
    interval_ms: i64,
}

impl IntervalKeyGenerator {
    /// Create a generator with the given bucket width in milliseconds.
    /// Width must be positive; config validation enforces this upstream.
    pub fn new(interval_ms: i64) -> Self {
        Self { interval_ms }
    }
}

impl CacheKeyGenerator for IntervalKeyGenerator {
    fn generate(&self, tenant: &str, request: &QueryRequest) -> String {
        let bucket = request.start.div_euclid(self.interval_ms);
        format!("{tenant}:{}:{}:{bucket}", request.query, request.step)
    }
}

/// Decorator that namespaces keys for scoped requests.
///
/// Wraps any base generator; when a request carries
/// [`options.scope`](crate::types::CacheOptions::scope), the scope is
/// prefixed onto the base key, keeping those entries apart from the shared
/// namespace. Unscoped requests pass through untouched. Built once at
/// construction and handed to the orchestrator — composition, not registry
/// mutation.
pub struct ScopedKeyGenerator {
    inner: Arc<dyn CacheKeyGenerator>,
}

impl ScopedKeyGenerator {
    pub fn new(inner: Arc<dyn CacheKeyGenerator>) -> Self {
        Self { inner }
    }
}

impl CacheKeyGenerator for ScopedKeyGenerator {
    fn generate(&self, tenant: &str, request: &QueryRequest) -> String {
        let key = self.inner.generate(tenant, request);
        match &request.options.scope {
            Some(scope) => format!("{scope}:{key}"),
            None => key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CacheOptions;

    #[test]
    fn buckets_by_interval() {
        let generator = IntervalKeyGenerator::new(1000);
        let req = QueryRequest::new("up", 2500, 3000, 10);
        assert_eq!(generator.generate("t1", &req), "t1:up:10:2");
    }

    #[test]
    fn same_window_same_key() {
        let generator = IntervalKeyGenerator::new(1000);
        let a = QueryRequest::new("up", 2000, 2400, 10);
        let b = QueryRequest::new("up", 2999, 3500, 10);
        assert_eq!(generator.generate("t1", &a), generator.generate("t1", &b));
    }

    #[test]
    fn negative_start_floors_down() {
        let generator = IntervalKeyGenerator::new(1000);
        let req = QueryRequest::new("up", -1, 10, 10);
        assert_eq!(generator.generate("t1", &req), "t1:up:10:-1");
    }

    #[test]
    fn scope_prefixes_key() {
        let base = Arc::new(IntervalKeyGenerator::new(1000));
        let generator = ScopedKeyGenerator::new(base);

        let plain = QueryRequest::new("up", 0, 100, 10);
        assert_eq!(generator.generate("t1", &plain), "t1:up:10:0");

        let scoped = plain.with_options(CacheOptions {
            scope: Some("canary".into()),
            ..CacheOptions::default()
        });
        assert_eq!(generator.generate("t1", &scoped), "canary:t1:up:10:0");
    }
}
