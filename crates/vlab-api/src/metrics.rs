//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::error::ApiResult;
use crate::functions::FunctionOutcome;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "vlab_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "vlab_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "vlab_http_requests_in_flight";

    // Function metrics
    pub const FUNCTION_INVOCATIONS_TOTAL: &str = "vlab_function_invocations_total";
    pub const FUNCTION_DURATION_SECONDS: &str = "vlab_function_duration_seconds";
    pub const DETECTIONS_SAVED_TOTAL: &str = "vlab_detections_saved_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record one function invocation and, on success, how many detections it saved.
pub fn record_function(function: &str, result: &ApiResult<FunctionOutcome>, duration_secs: f64) {
    let outcome = if result.is_ok() { "success" } else { "error" };
    let labels = [("function", function.to_string()), ("outcome", outcome.to_string())];

    counter!(names::FUNCTION_INVOCATIONS_TOTAL, &labels).increment(1);
    histogram!(names::FUNCTION_DURATION_SECONDS, &labels).record(duration_secs);

    if let Ok(outcome) = result {
        counter!(names::DETECTIONS_SAVED_TOTAL, "function" => function.to_string())
            .increment(outcome.count as u64);
    }
}

/// Metrics middleware for HTTP requests.
///
/// Requests are labelled by route template so unmatched paths share one series.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
