//! Detection records as persisted to the results bucket.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::event::ResultKind;
use crate::geometry::{PixelBox, Vertex};
use crate::likelihood::Likelihood;

/// Common behaviour of persisted detection records.
pub trait DetectionRecord: Serialize + DeserializeOwned + Send + Sync {
    /// Which result file this record type is stored in.
    const KIND: ResultKind;

    /// Bounding polygon as stored.
    fn vertices(&self) -> &[Vertex];

    /// Text drawn next to the bounding box.
    fn label(&self) -> String;
}

/// A localized object. Vertices are normalized to the image size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ObjectDetection {
    pub name: String,
    pub score: f64,
    pub vertices: Vec<Vertex>,
}

impl ObjectDetection {
    /// Pixel box for an image of the given size.
    pub fn pixel_box(&self, image_width: u32, image_height: u32) -> Option<PixelBox> {
        PixelBox::from_normalized(&self.vertices, image_width, image_height)
    }

    /// Score at or above the threshold.
    pub fn passes(&self, threshold: f64) -> bool {
        self.score >= threshold
    }
}

impl DetectionRecord for ObjectDetection {
    const KIND: ResultKind = ResultKind::Objects;

    fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    fn label(&self) -> String {
        format!("{}-{}", self.name, format_score(self.score))
    }
}

/// Shortest round-trip form, always with a fractional part (`1.0`, `0.85`).
fn format_score(score: f64) -> String {
    let mut text = score.to_string();
    if score.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}

/// A detected face. Vertices are absolute pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FaceDetection {
    pub anger: Likelihood,
    pub joy: Likelihood,
    pub surprise: Likelihood,
    pub vertices: Vec<Vertex>,
}

impl FaceDetection {
    pub fn pixel_box(&self) -> Option<PixelBox> {
        PixelBox::from_absolute(&self.vertices)
    }

    /// Emotions rated LIKELY or better, in the order JOY, ANGER, SURPRISE,
    /// joined by `" - "`. Empty if none qualify.
    pub fn emotion_label(&self) -> String {
        [
            ("JOY", self.joy),
            ("ANGER", self.anger),
            ("SURPRISE", self.surprise),
        ]
        .into_iter()
        .filter(|(_, likelihood)| likelihood.is_likely())
        .map(|(emotion, _)| emotion)
        .collect::<Vec<_>>()
        .join(" - ")
    }
}

impl DetectionRecord for FaceDetection {
    const KIND: ResultKind = ResultKind::Faces;

    fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    fn label(&self) -> String {
        self.emotion_label()
    }
}
