//! The results cache orchestrator.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::cache::{CacheBackend, CacheKeyGenerator, EntryCodec};
use crate::results::freshness::FreshnessFilter;
use crate::results::merge::ExtentMerger;
use crate::results::parallel::do_requests;
use crate::results::partition::Partitioner;
use crate::telemetry;
use crate::traits::{CachePolicy, Limits, QueryHandler};
use crate::types::{CachedEntry, Extent, QueryRequest, QueryResponse, ResponseMerger};
use crate::{CacheError, Result};

/// Millisecond clock, injectable for tests.
pub(crate) type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Results cache layered in front of a downstream query handler.
///
/// Each call generates a key, looks up the cached extents, partitions the
/// request into cached and missing sub-ranges, fans out the missing ones,
/// merges everything into one response, and rewrites the entry with the
/// coalesced, freshness-trimmed extents.
///
/// Concurrent calls for the same key race at the store step and the last
/// writer wins. The response any caller receives is always computed from
/// its own partition plus live sub-requests, never from a racing write,
/// so a lost update costs a future redundant recomputation, not a wrong
/// answer.
///
/// Construct via [`ResultsCacheBuilder`](crate::results::ResultsCacheBuilder).
pub struct ResultsCache {
    pub(crate) downstream: Arc<dyn QueryHandler>,
    pub(crate) backend: Arc<dyn CacheBackend>,
    pub(crate) key_generator: Arc<dyn CacheKeyGenerator>,
    pub(crate) limits: Arc<dyn Limits>,
    pub(crate) policy: Arc<dyn CachePolicy>,
    pub(crate) merger: Arc<dyn ResponseMerger>,
    pub(crate) codec: EntryCodec,
    pub(crate) partitioner: Partitioner,
    pub(crate) extent_merger: ExtentMerger,
    pub(crate) freshness: FreshnessFilter,
    pub(crate) clock: Clock,
}

impl ResultsCache {
    /// Serve `request` for `tenant`, through the cache when possible.
    pub async fn execute(&self, tenant: &str, request: &QueryRequest) -> Result<QueryResponse> {
        if request.start > request.end {
            return Err(CacheError::InvalidRequest(format!(
                "start {} is after end {}",
                request.start, request.end
            )));
        }
        if !request.is_instant() && request.step < 1 {
            return Err(CacheError::InvalidRequest(format!(
                "step must be >= 1 for ranged requests, got {}",
                request.step
            )));
        }

        let max_cache_time = self.max_cache_time(tenant, request);

        // Requests the policy declines, or that lie entirely inside the
        // freshness window, go straight downstream.
        if !self.policy.should_cache_request(request) || request.start > max_cache_time {
            metrics::counter!(telemetry::UNCACHED_TOTAL, "tenant" => tenant.to_owned())
                .increment(1);
            return self.downstream.do_request(tenant, request).await;
        }

        let key = self.key_generator.generate(tenant, request);
        let extents = self.lookup(tenant, &key).await;

        let (missing, cached_responses) = self.partitioner.partition(request, &extents);

        if missing.is_empty() {
            // Fully covered: nothing new was learned, so nothing to write.
            return self.merger.merge(cached_responses);
        }

        metrics::counter!(telemetry::SUBREQUESTS_TOTAL, "tenant" => tenant.to_owned())
            .increment(missing.len() as u64);

        let parallelism = self.limits.query_parallelism(tenant, request);
        let results = do_requests(self.downstream.as_ref(), tenant, missing, parallelism).await?;

        let trace_id = current_trace_id();
        let mut candidates = Vec::with_capacity(results.len());
        let mut new_responses = Vec::with_capacity(results.len());
        for result in results {
            if self
                .policy
                .should_cache_response(&result.request, &result.response, max_cache_time)
            {
                candidates.push(Extent::new(
                    result.request.start,
                    result.request.end,
                    trace_id.clone(),
                    result.response.clone(),
                ));
            }
            new_responses.push(result.response);
        }

        let mut pieces = cached_responses;
        pieces.extend(new_responses);
        let response = self.merger.merge(pieces)?;

        let mut all_extents = extents;
        all_extents.extend(candidates);
        let coalesced = self.extent_merger.merge_extents(request, all_extents)?;
        let persisted = self
            .freshness
            .filter_recent_extents(request, max_cache_time, coalesced);
        self.store(tenant, key, persisted).await;

        Ok(response)
    }

    /// The newest timestamp this tenant may cache, step-aligned for ranged
    /// requests. Instant queries bypass the rounding entirely.
    fn max_cache_time(&self, tenant: &str, request: &QueryRequest) -> i64 {
        let freshness = self.limits.max_cache_freshness(tenant);
        let cutoff = (self.clock)() - freshness.as_millis() as i64;
        if request.is_instant() {
            cutoff
        } else {
            cutoff.div_euclid(request.step) * request.step
        }
    }

    /// Fetch and decode the entry for `key`. Anything short of a fully
    /// valid entry under the expected key is a miss: absent value, backend
    /// trouble, key mismatch, or a payload that fails to decode. A partial
    /// reuse of a questionable entry could merge inconsistent data.
    async fn lookup(&self, tenant: &str, key: &str) -> Vec<Extent> {
        let keys = [key.to_owned()];
        let (found, values) = self.backend.fetch(&keys).await;

        let extents = found
            .iter()
            .position(|k| k == key)
            .and_then(|idx| match self.codec.decode(&values[idx]) {
                Ok(entry) if entry.key == key => Some(entry.extents),
                Ok(entry) => {
                    warn!(
                        expected = key,
                        stored = %entry.key,
                        "discarding cached entry with mismatched key"
                    );
                    None
                }
                Err(error) => {
                    warn!(key, error = %error, "discarding undecodable cached entry");
                    None
                }
            });

        match extents {
            Some(extents) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "tenant" => tenant.to_owned())
                    .increment(1);
                extents
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "tenant" => tenant.to_owned())
                    .increment(1);
                Vec::new()
            }
        }
    }

    /// Overwrite the entry for `key`. Failures are logged and counted,
    /// never surfaced: the response was already assembled, and a missed
    /// write only costs a future recomputation.
    async fn store(&self, tenant: &str, key: String, extents: Vec<Extent>) {
        let entry = CachedEntry::new(key.clone(), extents);
        let bytes = match self.codec.encode(&entry) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(key = %key, error = %error, "failed to encode cache entry");
                metrics::counter!(telemetry::STORE_FAILURES_TOTAL, "tenant" => tenant.to_owned())
                    .increment(1);
                return;
            }
        };
        if let Err(error) = self.backend.store(vec![key.clone()], vec![bytes]).await {
            warn!(key = %key, error = %error, "failed to store cache entry");
            metrics::counter!(telemetry::STORE_FAILURES_TOTAL, "tenant" => tenant.to_owned())
                .increment(1);
        }
    }
}

/// The results cache is itself a handler, so it can be layered into an
/// existing query path.
#[async_trait]
impl QueryHandler for ResultsCache {
    async fn do_request(&self, tenant: &str, request: &QueryRequest) -> Result<QueryResponse> {
        self.execute(tenant, request).await
    }
}

/// Trace id of the current span, for extent provenance. Empty when no
/// subscriber is installed.
fn current_trace_id() -> String {
    tracing::Span::current()
        .id()
        .map(|id| format!("{:x}", id.into_u64()))
        .unwrap_or_default()
}
