//! Cached extent and entry types

use serde::{Deserialize, Serialize};

use crate::types::QueryResponse;

/// A cached result fragment covering `[start, end]` (inclusive, ms).
///
/// Invariant: `start <= end`. Within a persisted entry, extents are sorted
/// ascending by `start` and pairwise non-overlapping; overlap may exist
/// transiently inside the merge pass, never at rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub start: i64,
    pub end: i64,
    /// Trace id of the call that produced this fragment, for provenance
    /// when debugging a served cache entry. Empty when no subscriber was
    /// installed.
    #[serde(default)]
    pub trace_id: String,
    pub response: QueryResponse,
}

impl Extent {
    pub fn new(start: i64, end: i64, trace_id: String, response: QueryResponse) -> Self {
        Self {
            start,
            end,
            trace_id,
            response,
        }
    }
}

/// The persisted value for one cache key.
///
/// `key` is stored alongside the extents: a fetched entry whose key does
/// not equal the freshly generated one is discarded wholesale, defending
/// against hash collisions in the external byte cache and against stale
/// record formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedEntry {
    pub key: String,
    pub extents: Vec<Extent>,
}

impl CachedEntry {
    pub fn new(key: impl Into<String>, extents: Vec<Extent>) -> Self {
        Self {
            key: key.into(),
            extents,
        }
    }
}
