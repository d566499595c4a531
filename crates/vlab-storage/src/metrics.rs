//! Storage metrics collection.

use std::future::Future;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{info_span, Instrument};

use crate::error::StorageResult;

pub mod names {
    /// Total storage requests by backend, operation and status.
    pub const REQUESTS_TOTAL: &str = "storage_requests_total";

    /// Total retry attempts by operation.
    pub const RETRIES_TOTAL: &str = "storage_retries_total";

    /// Request latency in seconds by backend and operation.
    pub const LATENCY_SECONDS: &str = "storage_latency_seconds";
}

pub fn record_request(backend: &str, operation: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "backend" => backend.to_string(),
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "backend" => backend.to_string(),
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

pub fn record_retry(operation: &str) {
    counter!(names::RETRIES_TOTAL, "operation" => operation.to_string()).increment(1);
}

/// Run a storage call inside a span and record its outcome.
pub async fn observe<T, F>(backend: &str, operation: &str, bucket: &str, key: &str, fut: F) -> StorageResult<T>
where
    F: Future<Output = StorageResult<T>>,
{
    let span = info_span!(
        "storage_request",
        backend = %backend,
        operation = %operation,
        bucket = %bucket,
        key = %key
    );

    let start = Instant::now();
    let result = fut.instrument(span).await;
    let status = match &result {
        Ok(_) => 200,
        Err(e) => e.http_status(),
    };
    record_request(backend, operation, status, start.elapsed().as_millis() as f64);

    result
}
