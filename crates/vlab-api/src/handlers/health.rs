//! Liveness and readiness checks.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use vlab_storage::StorageResult;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

/// `GET /health`: the process is up.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub result_bucket: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub storage: BackendCheck,
}

/// Outcome of probing one backend.
#[derive(Serialize)]
pub struct BackendCheck {
    pub backend: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub latency_ms: u64,
}

impl BackendCheck {
    fn from_result(backend: impl Into<String>, result: StorageResult<()>, started: Instant) -> Self {
        let latency_ms = started.elapsed().as_millis() as u64;
        Self {
            backend: backend.into(),
            ok: result.is_ok(),
            error: result.err().map(|e| e.to_string()),
            latency_ms,
        }
    }
}

/// `GET /ready`: the results bucket is reachable.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let started = Instant::now();
    let result = state.storage.check_connectivity(state.result_bucket()).await;
    let storage = BackendCheck::from_result(state.storage.backend().as_str(), result, started);

    let (status, label) = if storage.ok {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(ReadinessResponse {
            status: label,
            result_bucket: state.result_bucket().to_string(),
            checks: ReadinessChecks { storage },
        }),
    )
}
