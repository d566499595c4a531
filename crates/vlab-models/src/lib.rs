//! Shared data models for vision-lab.
//!
//! This crate provides Serde-serializable types for:
//! - Storage events identifying an uploaded image
//! - Object and face detection records as persisted to the results bucket
//! - Likelihood levels reported by the face detector
//! - Pixel-space bounding boxes and the labels drawn next to them

pub mod detection;
pub mod error;
pub mod event;
pub mod geometry;
pub mod likelihood;
pub mod results;

// Re-export common types
pub use detection::{DetectionRecord, FaceDetection, ObjectDetection};
pub use error::{ModelError, ModelResult};
pub use event::{result_filename, ResultKind, StorageEvent};
pub use geometry::{PixelBox, Vertex};
pub use likelihood::{Likelihood, LikelihoodParseError};
pub use results::DetectionResults;
