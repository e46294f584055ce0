//! Coalesces extents into a minimal, non-overlapping covering set.

use std::sync::Arc;

use crate::types::{Extent, QueryRequest, ResponseMerger};
use crate::Result;

/// Merges previously retained and freshly fetched extents.
///
/// Extents are sorted ascending by start, ties broken by larger end first
/// so a superseding wider extent is considered before the smaller ones it
/// makes redundant. An accumulator then sweeps once: a gap wider than one
/// sampling step flushes it, a subsumed extent is dropped, anything else
/// extends it. The `+ step` slack treats a one-step boundary between
/// adjacent extents as contiguous, so step-sampled series are not
/// fragmented at bucket seams.
pub(crate) struct ExtentMerger {
    merger: Arc<dyn ResponseMerger>,
}

impl ExtentMerger {
    pub(crate) fn new(merger: Arc<dyn ResponseMerger>) -> Self {
        Self { merger }
    }

    pub(crate) fn merge_extents(
        &self,
        request: &QueryRequest,
        mut extents: Vec<Extent>,
    ) -> Result<Vec<Extent>> {
        if extents.is_empty() {
            return Ok(extents);
        }
        extents.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

        let mut iter = extents.into_iter();
        let first = iter.next().unwrap();
        let mut acc_start = first.start;
        let mut acc_end = first.end;
        let mut acc_trace = first.trace_id;
        let mut acc_response = first.response;
        let mut merged = Vec::new();

        for extent in iter {
            if acc_end + request.step < extent.start {
                // A real gap.
                merged.push(Extent::new(acc_start, acc_end, acc_trace, acc_response));
                acc_start = extent.start;
                acc_end = extent.end;
                acc_trace = extent.trace_id;
                acc_response = extent.response;
                continue;
            }
            if acc_end >= extent.end {
                // Fully subsumed by what the accumulator already covers.
                continue;
            }
            acc_end = extent.end;
            acc_response = self.merger.merge(vec![acc_response, extent.response])?;
            acc_trace = extent.trace_id;
        }
        merged.push(Extent::new(acc_start, acc_end, acc_trace, acc_response));

        Ok(merged)
    }
}
