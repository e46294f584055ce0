//! Chronocache - partial-results cache for time-ranged queries
//!
//! This crate layers a results cache in front of a time-ranged query
//! backend. Results are cached per (tenant, query, step, time bucket);
//! an incoming request is split into already-cached and not-yet-cached
//! sub-ranges, only the missing pieces are fetched (with bounded
//! concurrency and fail-fast cancellation), and everything is merged into
//! one response. Recent, still-mutable data is kept out of the cache by a
//! per-tenant freshness window.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chronocache::{QueryHandler, QueryRequest, ResultsCacheBuilder};
//!
//! # async fn run(engine: Arc<dyn QueryHandler>) -> chronocache::Result<()> {
//! let cache = ResultsCacheBuilder::new()
//!     .downstream(engine)
//!     .build()?;
//!
//! let request = QueryRequest::new("sum(rate(http_requests_total[5m]))", 0, 3_600_000, 15_000);
//! let response = cache.execute("tenant-1", &request).await?;
//! # let _ = response;
//! # Ok(())
//! # }
//! ```
//!
//! The cache is a pure optimization layer: failures in it surface only as
//! extra latency (more misses), never as different answers. Concurrent
//! writers to one key race at the store step and the last writer wins.

pub mod cache;
pub mod config;
pub mod error;
pub mod results;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export main types at crate root
pub use error::{CacheError, Result};
pub use results::{do_requests, ResultsCache, ResultsCacheBuilder};
pub use traits::{CachePolicy, DefaultCachePolicy, Limits, QueryHandler, StaticLimits};

// Re-export all types
pub use types::{
    CacheOptions, CachedEntry, Extent, Extractor, QueryRequest, QueryResponse, RequestResponse,
    ResponseMerger, Sample, Series, SeriesExtractor, SeriesMerger,
};
