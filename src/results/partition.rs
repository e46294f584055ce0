//! Splits a request's time range into cached and missing sub-ranges.

use std::sync::Arc;

use crate::types::{Extent, Extractor, QueryRequest, QueryResponse};

/// Partitions requests against the sorted extents of a cached entry.
///
/// One ascending pass with a cursor starting at `request.start`: every
/// extent either advances the cursor (contributing its overlap as a cached
/// fragment, possibly preceded by a missing sub-request for the gap before
/// it) or is skipped. Whatever remains after the last usable extent
/// becomes the final missing sub-request. The union of missing ranges and
/// extracted fragments covers `[start, end]` exactly.
pub(crate) struct Partitioner {
    min_cache_extent_ms: i64,
    only_use_entire_extent: bool,
    extractor: Arc<dyn Extractor>,
}

impl Partitioner {
    pub(crate) fn new(
        min_cache_extent_ms: i64,
        only_use_entire_extent: bool,
        extractor: Arc<dyn Extractor>,
    ) -> Self {
        Self {
            min_cache_extent_ms,
            only_use_entire_extent,
            extractor,
        }
    }

    pub(crate) fn partition(
        &self,
        request: &QueryRequest,
        extents: &[Extent],
    ) -> (Vec<QueryRequest>, Vec<QueryResponse>) {
        let mut missing = Vec::new();
        let mut cached = Vec::new();
        let mut cursor = request.start;

        for extent in extents {
            // No overlap with the still-uncovered part of the range.
            if extent.end < cursor || extent.start > request.end {
                continue;
            }
            // Response shapes that cannot be sub-range extracted make
            // partial extents all-or-nothing.
            if self.only_use_entire_extent
                && (extent.start < request.start || extent.end > request.end)
            {
                continue;
            }
            // Tiny extents would fragment a wide query into many small
            // downstream calls. Instant queries are exempt: any match is
            // an exact match.
            if request.end - request.start > self.min_cache_extent_ms
                && extent.end - extent.start < self.min_cache_extent_ms
                && !request.is_instant()
            {
                continue;
            }

            if cursor < extent.start {
                missing.push(request.with_range(cursor, extent.start));
            }
            cached.push(self.extractor.extract(
                cursor,
                request.end,
                &extent.response,
                extent.start,
                extent.end,
            ));
            cursor = extent.end;
        }

        if cursor < request.end {
            missing.push(request.with_range(cursor, request.end));
        }

        // The range logic cannot represent a zero-width gap: an unmatched
        // instant query goes downstream as-is.
        if request.is_instant() && cached.is_empty() {
            missing = vec![request.clone()];
        }

        (missing, cached)
    }
}
