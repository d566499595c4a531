//! Client for the Cloud Vision `images:annotate` REST API.
//!
//! This crate provides:
//! - Object localization and face detection requests
//! - Typed wire structures for the batch annotate response
//! - Conversion of annotations into persisted detection records
//! - Retry with exponential backoff on transient failures

pub mod client;
pub mod error;
pub mod metrics;
pub mod types;

pub use client::{VisionClient, VisionConfig};
pub use error::{VisionError, VisionResult};
pub use types::{FaceAnnotation, FeatureType, ImageInput, LocalizedObjectAnnotation};
