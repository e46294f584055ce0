//! The results cache pipeline.
//!
//! [`ResultsCache`] composes the pieces in data-flow order: generate a
//! key, look up cached extents, partition the request, fan out the
//! missing sub-ranges, merge responses, coalesce extent bookkeeping, trim
//! still-mutable data, write back. Partitioning, merging, and freshness
//! trimming are pure; only the lookup, the fan-out, and the write-back
//! suspend.

mod builder;
mod cache;
mod freshness;
mod merge;
mod parallel;
mod partition;

pub use builder::ResultsCacheBuilder;
pub use cache::ResultsCache;
pub use parallel::do_requests;
