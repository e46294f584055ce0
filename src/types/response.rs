//! Query response types, merging, and sub-range extraction.
//!
//! [`QueryResponse`] is an adjacently tagged serde enum: the `kind` field
//! is the discriminator that lets one cache entry format store
//! heterogeneous response shapes. Decoding a payload whose `kind` matches
//! no known variant fails, and the whole stored entry is discarded as a
//! miss rather than partially reused.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};
use crate::types::QueryRequest;

/// A single (timestamp, value) point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp_ms: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp_ms: i64, value: f64) -> Self {
        Self {
            timestamp_ms,
            value,
        }
    }
}

/// One labelled series of samples, sorted ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub labels: BTreeMap<String, String>,
    pub samples: Vec<Sample>,
}

impl Series {
    pub fn new(labels: BTreeMap<String, String>, samples: Vec<Sample>) -> Self {
        Self { labels, samples }
    }
}

/// A downstream query result.
///
/// `kind` is the stored discriminator; unknown kinds fail decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum QueryResponse {
    /// Range data: one entry per series.
    Matrix(Vec<Series>),
    /// A single point, produced by instant queries.
    Instant(Sample),
}

/// Pairing of a generated sub-request with its response, as yielded by the
/// parallel executor. Order follows completion, not submission.
#[derive(Debug, Clone)]
pub struct RequestResponse {
    pub request: QueryRequest,
    pub response: QueryResponse,
}

/// Combines several responses into one.
pub trait ResponseMerger: Send + Sync {
    fn merge(&self, responses: Vec<QueryResponse>) -> Result<QueryResponse>;
}

/// Extracts the sub-range `[start, end]` of a response.
///
/// `response_start`/`response_end` are the bounds the response was computed
/// for; implementations that align output to step boundaries need them.
pub trait Extractor: Send + Sync {
    fn extract(
        &self,
        start: i64,
        end: i64,
        response: &QueryResponse,
        response_start: i64,
        response_end: i64,
    ) -> QueryResponse;
}

/// Merges matrix responses by series identity.
///
/// Series with the same label set are combined: samples concatenated,
/// sorted by timestamp, duplicates collapsed keeping the first occurrence.
/// Adjacent cached and freshly fetched pieces share their boundary sample,
/// so the dedup is what keeps the merged output single-valued per step.
///
/// A single-element merge is the identity for any variant. Merging
/// several instant responses, or mixed variants, has no meaning and fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesMerger;

impl ResponseMerger for SeriesMerger {
    fn merge(&self, responses: Vec<QueryResponse>) -> Result<QueryResponse> {
        if responses.is_empty() {
            return Err(CacheError::Merge("no responses to merge".into()));
        }
        if responses.len() == 1 {
            return Ok(responses.into_iter().next().unwrap());
        }

        let mut by_labels: BTreeMap<BTreeMap<String, String>, Vec<Sample>> = BTreeMap::new();
        for response in responses {
            match response {
                QueryResponse::Matrix(series) => {
                    for s in series {
                        by_labels.entry(s.labels).or_default().extend(s.samples);
                    }
                }
                QueryResponse::Instant(_) => {
                    return Err(CacheError::Merge(
                        "instant responses cannot be combined".into(),
                    ));
                }
            }
        }

        let merged = by_labels
            .into_iter()
            .map(|(labels, mut samples)| {
                samples.sort_by_key(|s| s.timestamp_ms);
                samples.dedup_by_key(|s| s.timestamp_ms);
                Series { labels, samples }
            })
            .collect();

        Ok(QueryResponse::Matrix(merged))
    }
}

/// Clamps matrix samples to the requested sub-range.
///
/// Bounds are inclusive on both ends. Instant responses pass through
/// unchanged: a point cannot be sub-ranged, which is why instant results
/// are only safely cacheable under the entire-extent policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesExtractor;

impl Extractor for SeriesExtractor {
    fn extract(
        &self,
        start: i64,
        end: i64,
        response: &QueryResponse,
        _response_start: i64,
        _response_end: i64,
    ) -> QueryResponse {
        match response {
            QueryResponse::Matrix(series) => QueryResponse::Matrix(
                series
                    .iter()
                    .map(|s| Series {
                        labels: s.labels.clone(),
                        samples: s
                            .samples
                            .iter()
                            .filter(|sample| {
                                sample.timestamp_ms >= start && sample.timestamp_ms <= end
                            })
                            .copied()
                            .collect(),
                    })
                    .collect(),
            ),
            QueryResponse::Instant(sample) => QueryResponse::Instant(*sample),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(name: &str) -> BTreeMap<String, String> {
        BTreeMap::from([("__name__".to_string(), name.to_string())])
    }

    fn matrix(name: &str, timestamps: &[i64]) -> QueryResponse {
        QueryResponse::Matrix(vec![Series::new(
            labels(name),
            timestamps
                .iter()
                .map(|&ts| Sample::new(ts, ts as f64))
                .collect(),
        )])
    }

    #[test]
    fn merge_single_is_identity() {
        let resp = QueryResponse::Instant(Sample::new(5, 1.0));
        let merged = SeriesMerger.merge(vec![resp.clone()]).unwrap();
        assert_eq!(merged, resp);
    }

    #[test]
    fn merge_empty_fails() {
        assert!(SeriesMerger.merge(vec![]).is_err());
    }

    #[test]
    fn merge_dedups_boundary_samples() {
        let merged = SeriesMerger
            .merge(vec![matrix("up", &[0, 10, 20]), matrix("up", &[20, 30])])
            .unwrap();
        assert_eq!(merged, matrix("up", &[0, 10, 20, 30]));
    }

    #[test]
    fn merge_unions_distinct_series() {
        let merged = SeriesMerger
            .merge(vec![matrix("up", &[0]), matrix("down", &[10])])
            .unwrap();
        match merged {
            QueryResponse::Matrix(series) => assert_eq!(series.len(), 2),
            other => panic!("expected matrix, got {other:?}"),
        }
    }

    #[test]
    fn merge_multiple_instants_fails() {
        let result = SeriesMerger.merge(vec![
            QueryResponse::Instant(Sample::new(1, 1.0)),
            QueryResponse::Instant(Sample::new(2, 2.0)),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn extract_clamps_inclusive() {
        let resp = matrix("up", &[0, 10, 20, 30, 40]);
        let sub = SeriesExtractor.extract(10, 30, &resp, 0, 40);
        assert_eq!(sub, matrix("up", &[10, 20, 30]));
    }

    #[test]
    fn extract_instant_passes_through() {
        let resp = QueryResponse::Instant(Sample::new(7, 3.0));
        assert_eq!(SeriesExtractor.extract(0, 5, &resp, 7, 7), resp);
    }

    #[test]
    fn decode_rejects_unknown_kind() {
        let err = serde_json::from_str::<QueryResponse>(r#"{"kind":"histogram","data":[]}"#);
        assert!(err.is_err());
    }
}
