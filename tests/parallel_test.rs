//! Tests for the bounded parallel executor.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chronocache::{
    do_requests, CacheError, QueryHandler, QueryRequest, QueryResponse, Result, Sample,
};

/// Handler that tracks how many calls run concurrently and how many were
/// ever started.
struct TrackingEngine {
    current: AtomicUsize,
    peak: AtomicUsize,
    started: AtomicUsize,
    fail_at_start: Option<i64>,
    delay: Duration,
}

impl TrackingEngine {
    fn new(delay: Duration) -> Self {
        Self {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            started: AtomicUsize::new(0),
            fail_at_start: None,
            delay,
        }
    }

    fn failing_at(start: i64) -> Self {
        Self {
            fail_at_start: Some(start),
            ..Self::new(Duration::ZERO)
        }
    }
}

#[async_trait]
impl QueryHandler for TrackingEngine {
    async fn do_request(&self, _tenant: &str, request: &QueryRequest) -> Result<QueryResponse> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let running = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.current.fetch_sub(1, Ordering::SeqCst);

        if self.fail_at_start == Some(request.start) {
            return Err(CacheError::Downstream("boom".into()));
        }
        Ok(QueryResponse::Instant(Sample::new(request.start, 1.0)))
    }
}

fn requests(n: i64) -> Vec<QueryRequest> {
    (0..n)
        .map(|i| QueryRequest::new("up", i * 100, i * 100 + 100, 10))
        .collect()
}

// =========================================================================
// Success paths
// =========================================================================

#[tokio::test]
async fn returns_all_results() {
    let engine = TrackingEngine::new(Duration::ZERO);
    let results = do_requests(&engine, "t1", requests(5), 3).await.unwrap();
    assert_eq!(results.len(), 5);

    // Completion order may differ from input order; compare as sets.
    let starts: BTreeSet<i64> = results.iter().map(|r| r.request.start).collect();
    assert_eq!(starts, (0..5).map(|i| i * 100).collect());
}

#[tokio::test]
async fn works_for_every_parallelism_up_to_n() {
    for parallelism in 1..=4 {
        let engine = TrackingEngine::new(Duration::ZERO);
        let results = do_requests(&engine, "t1", requests(4), parallelism)
            .await
            .unwrap();
        assert_eq!(results.len(), 4, "parallelism {parallelism}");
    }
}

#[tokio::test]
async fn empty_input_returns_immediately() {
    let engine = TrackingEngine::new(Duration::from_secs(60));
    let results = do_requests(&engine, "t1", Vec::new(), 8).await.unwrap();
    assert!(results.is_empty());
    assert_eq!(engine.started.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn zero_parallelism_is_clamped() {
    let engine = TrackingEngine::new(Duration::ZERO);
    let results = do_requests(&engine, "t1", requests(3), 0).await.unwrap();
    assert_eq!(results.len(), 3);
}

// =========================================================================
// Concurrency bound
// =========================================================================

#[tokio::test]
async fn in_flight_never_exceeds_parallelism() {
    let engine = TrackingEngine::new(Duration::from_millis(30));
    do_requests(&engine, "t1", requests(9), 3).await.unwrap();
    assert!(engine.peak.load(Ordering::SeqCst) <= 3);
    assert_eq!(engine.started.load(Ordering::SeqCst), 9);
}

// =========================================================================
// Fail-fast
// =========================================================================

#[tokio::test]
async fn first_error_is_returned() {
    let engine = TrackingEngine::failing_at(200);
    let result = do_requests(&engine, "t1", requests(5), 2).await;
    assert!(matches!(result, Err(CacheError::Downstream(_))));
}

#[tokio::test]
async fn error_stops_unstarted_requests() {
    // Sequential execution: the failure of the first request must prevent
    // the rest from ever starting.
    let engine = TrackingEngine::failing_at(0);
    let result = do_requests(&engine, "t1", requests(4), 1).await;
    assert!(result.is_err());
    assert_eq!(engine.started.load(Ordering::SeqCst), 1);
}
