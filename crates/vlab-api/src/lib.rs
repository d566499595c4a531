//! Axum HTTP server for the vision functions.
//!
//! This crate provides:
//! - `POST /functions/localize-objects` and `POST /functions/detect-faces`
//! - Storage event and Pub/Sub push payload decoding
//! - The annotate-then-persist pipelines, shared with the CLI
//! - Health, readiness and Prometheus metrics endpoints

pub mod config;
pub mod error;
pub mod event;
pub mod functions;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{ApiConfig, AppConfig, ConfigError};
pub use error::{ApiError, ApiResult};
pub use event::decode_event;
pub use functions::FunctionOutcome;
pub use routes::create_router;
pub use state::AppState;
