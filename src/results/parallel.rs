//! Bounded fan-out of missing sub-requests.

use futures_util::stream::{self, StreamExt, TryStreamExt};

use crate::traits::QueryHandler;
use crate::types::{QueryRequest, RequestResponse};
use crate::Result;

/// Run `requests` against `handler` with at most `parallelism` in flight.
///
/// The first error observed is returned and every other in-flight or
/// not-yet-started sub-request is cancelled by dropping its future, so a
/// failing fan-out stops doing work immediately. Results arrive in
/// completion order, not submission order — callers must not assume
/// positional correspondence with the input. Dropping the returned future
/// cancels everything in flight. An empty `requests` returns immediately.
pub async fn do_requests(
    handler: &dyn QueryHandler,
    tenant: &str,
    requests: Vec<QueryRequest>,
    parallelism: usize,
) -> Result<Vec<RequestResponse>> {
    if requests.is_empty() {
        return Ok(Vec::new());
    }
    let parallelism = parallelism.clamp(1, requests.len());

    stream::iter(requests)
        .map(|request| async move {
            let response = handler.do_request(tenant, &request).await?;
            Ok(RequestResponse { request, response })
        })
        .buffer_unordered(parallelism)
        .try_collect()
        .await
}
