//! Storage events and result file naming.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ModelError, ModelResult};

/// Notification payload identifying a stored object.
///
/// Cloud Storage events carry many more fields (size, contentType,
/// generation, ...); only `bucket` and `name` are used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, JsonSchema)]
pub struct StorageEvent {
    /// Bucket holding the image
    #[validate(length(min = 1, message = "bucket must not be empty"))]
    pub bucket: String,
    /// Object name within the bucket
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
}

impl StorageEvent {
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
        }
    }

    /// Parse a `gs://bucket/object/name` reference.
    pub fn from_gcs_uri(uri: &str) -> ModelResult<Self> {
        let rest = uri
            .strip_prefix("gs://")
            .ok_or_else(|| ModelError::invalid_uri(format!("{} does not start with gs://", uri)))?;

        match rest.split_once('/') {
            Some((bucket, name)) if !bucket.is_empty() && !name.is_empty() => {
                Ok(Self::new(bucket, name))
            }
            _ => Err(ModelError::invalid_uri(format!(
                "{} must name both a bucket and an object",
                uri
            ))),
        }
    }

    /// Validate and return self.
    pub fn validated(self) -> ModelResult<Self> {
        self.validate()
            .map_err(|e| ModelError::invalid_event(e.to_string()))?;
        Ok(self)
    }

    /// Image reference understood by the vision service.
    pub fn gcs_uri(&self) -> String {
        format!("gs://{}/{}", self.bucket, self.name)
    }

    /// Name of the results file for this image.
    pub fn result_filename(&self, kind: ResultKind) -> String {
        result_filename(&self.name, kind)
    }
}

impl fmt::Display for StorageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gs://{}/{}", self.bucket, self.name)
    }
}

/// Kind of detection run, which decides the result file suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Objects,
    Faces,
}

impl ResultKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ResultKind::Objects => ".objects.json",
            ResultKind::Faces => ".faces.json",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKind::Objects => "objects",
            ResultKind::Faces => "faces",
        }
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `<original_filename><extension>`, e.g. `street.jpg.objects.json`.
pub fn result_filename(original: &str, kind: ResultKind) -> String {
    format!("{}{}", original, kind.extension())
}
