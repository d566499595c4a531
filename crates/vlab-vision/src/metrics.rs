//! Vision request metrics.

use metrics::{counter, histogram};

pub mod names {
    /// Total vision requests by feature and status.
    pub const REQUESTS_TOTAL: &str = "vision_requests_total";

    /// Total retry attempts by feature.
    pub const RETRIES_TOTAL: &str = "vision_retries_total";

    /// Request latency in seconds by feature.
    pub const LATENCY_SECONDS: &str = "vision_latency_seconds";

    /// Annotations returned by feature.
    pub const ANNOTATIONS_TOTAL: &str = "vision_annotations_total";
}

pub fn record_request(feature: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "feature" => feature.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(names::LATENCY_SECONDS, "feature" => feature.to_string()).record(latency_ms / 1000.0);
}

pub fn record_retry(feature: &str) {
    counter!(names::RETRIES_TOTAL, "feature" => feature.to_string()).increment(1);
}

pub fn record_annotations(feature: &str, count: usize) {
    counter!(names::ANNOTATIONS_TOTAL, "feature" => feature.to_string()).increment(count as u64);
}
