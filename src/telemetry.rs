//! Telemetry metric name constants.
//!
//! Centralised metric names for chronocache operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `chronocache_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `tenant` — tenant id the request was issued for

/// Total lookups that found a usable cached entry.
///
/// Labels: `tenant`.
pub const CACHE_HITS_TOTAL: &str = "chronocache_hits_total";

/// Total lookups that found nothing usable (absent, key mismatch, or
/// undecodable entry).
///
/// Labels: `tenant`.
pub const CACHE_MISSES_TOTAL: &str = "chronocache_misses_total";

/// Total requests forwarded straight to the downstream handler without
/// touching the cache (policy declined or range inside the freshness window).
///
/// Labels: `tenant`.
pub const UNCACHED_TOTAL: &str = "chronocache_uncached_total";

/// Total sub-requests dispatched downstream to fill gaps.
///
/// Labels: `tenant`.
pub const SUBREQUESTS_TOTAL: &str = "chronocache_subrequests_total";

/// Total entry writes that failed and were swallowed.
///
/// Labels: `tenant`.
pub const STORE_FAILURES_TOTAL: &str = "chronocache_store_failures_total";
