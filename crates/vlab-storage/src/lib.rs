//! Object storage for images and detection results.
//!
//! This crate provides:
//! - The `ObjectStore` trait (put/get of single objects)
//! - Cloud Storage JSON API client
//! - S3-compatible client (GCS interoperability, MinIO, R2)
//! - Local directory store for development and tests
//! - Saving and loading detection result documents

pub mod error;
pub mod gcs;
pub mod local;
pub mod metrics;
pub mod results;
pub mod retry;
pub mod s3;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use gcs::{GcsClient, GcsConfig};
pub use local::LocalStore;
pub use results::{load_results, save_results};
pub use retry::RetryConfig;
pub use s3::{S3Client, S3Config};
pub use store::{from_env, ObjectStore, StorageBackend};
