//! Trims extents that fall inside the still-mutable freshness window.

use std::sync::Arc;

use crate::types::{Extent, Extractor, QueryRequest};

/// Trims extents before persistence so nothing newer than the freshness
/// boundary is cached.
///
/// Data inside the freshness window may still be revised upstream
/// (ingestion delay); persisting it would serve stale values later.
/// Extents ending past `max_cache_time` are truncated there and their
/// body re-extracted for the shortened range; extents lying entirely past
/// it are dropped. This only shapes what is persisted — the response for
/// the current call was already assembled from the untrimmed merge.
pub(crate) struct FreshnessFilter {
    extractor: Arc<dyn Extractor>,
}

impl FreshnessFilter {
    pub(crate) fn new(extractor: Arc<dyn Extractor>) -> Self {
        Self { extractor }
    }

    pub(crate) fn filter_recent_extents(
        &self,
        _request: &QueryRequest,
        max_cache_time: i64,
        extents: Vec<Extent>,
    ) -> Vec<Extent> {
        extents
            .into_iter()
            .filter_map(|mut extent| {
                if extent.start > max_cache_time {
                    return None;
                }
                if extent.end > max_cache_time {
                    extent.response = self.extractor.extract(
                        extent.start,
                        max_cache_time,
                        &extent.response,
                        extent.start,
                        extent.end,
                    );
                    extent.end = max_cache_time;
                }
                Some(extent)
            })
            .collect()
    }
}
