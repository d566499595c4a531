//! Vision API request/response types.
//!
//! Field names follow the REST API's camelCase JSON. Proto3 JSON omits
//! zero values, so every numeric field defaults.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use vlab_models::{FaceDetection, Likelihood, ObjectDetection};

// =============================================================================
// Request
// =============================================================================

/// Image to annotate.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageInput {
    /// `gs://` or `https://` reference read by the service.
    Uri(String),
    /// Raw encoded image bytes, sent inline.
    Content(Vec<u8>),
}

impl ImageInput {
    pub fn uri(uri: impl Into<String>) -> Self {
        ImageInput::Uri(uri.into())
    }

    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            ImageInput::Uri(uri) => uri.clone(),
            ImageInput::Content(bytes) => format!("<{} inline bytes>", bytes.len()),
        }
    }

    fn to_wire(&self) -> Image {
        match self {
            ImageInput::Uri(uri) => Image {
                content: None,
                source: Some(ImageSource {
                    image_uri: uri.clone(),
                }),
            },
            ImageInput::Content(bytes) => Image {
                content: Some(STANDARD.encode(bytes)),
                source: None,
            },
        }
    }
}

/// Detection feature to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureType {
    ObjectLocalization,
    FaceDetection,
}

impl FeatureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::ObjectLocalization => "OBJECT_LOCALIZATION",
            FeatureType::FaceDetection => "FACE_DETECTION",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAnnotateImagesRequest {
    pub requests: Vec<AnnotateImageRequest>,
}

impl BatchAnnotateImagesRequest {
    /// A batch of one image with one feature.
    pub fn single(image: &ImageInput, feature: FeatureType, max_results: Option<u32>) -> Self {
        Self {
            requests: vec![AnnotateImageRequest {
                image: image.to_wire(),
                features: vec![Feature {
                    feature_type: feature,
                    max_results,
                }],
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateImageRequest {
    pub image: Image,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ImageSource>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource {
    pub image_uri: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    #[serde(rename = "type")]
    pub feature_type: FeatureType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

// =============================================================================
// Response
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAnnotateImagesResponse {
    #[serde(default)]
    pub responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateImageResponse {
    #[serde(default)]
    pub localized_object_annotations: Vec<LocalizedObjectAnnotation>,
    #[serde(default)]
    pub face_annotations: Vec<FaceAnnotation>,
    pub error: Option<Status>,
}

/// Per-image error status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingPoly {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
    #[serde(default)]
    pub normalized_vertices: Vec<NormalizedVertex>,
}

/// Pixel vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
}

/// Vertex normalized to 0.0..1.0 of the image size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct NormalizedVertex {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedObjectAnnotation {
    /// Knowledge Graph entity id
    #[serde(default)]
    pub mid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub bounding_poly: BoundingPoly,
}

impl LocalizedObjectAnnotation {
    pub fn to_detection(&self) -> ObjectDetection {
        ObjectDetection {
            name: self.name.clone(),
            score: self.score,
            vertices: self
                .bounding_poly
                .normalized_vertices
                .iter()
                .map(|v| (v.x, v.y))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceAnnotation {
    #[serde(default)]
    pub bounding_poly: BoundingPoly,
    #[serde(default)]
    pub detection_confidence: f64,
    #[serde(default)]
    pub joy_likelihood: Likelihood,
    #[serde(default)]
    pub sorrow_likelihood: Likelihood,
    #[serde(default)]
    pub anger_likelihood: Likelihood,
    #[serde(default)]
    pub surprise_likelihood: Likelihood,
}

impl FaceAnnotation {
    pub fn to_detection(&self) -> FaceDetection {
        FaceDetection {
            anger: self.anger_likelihood,
            joy: self.joy_likelihood,
            surprise: self.surprise_likelihood,
            vertices: self
                .bounding_poly
                .vertices
                .iter()
                .map(|v| (v.x as f64, v.y as f64))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_with_uri() {
        let request = BatchAnnotateImagesRequest::single(
            &ImageInput::uri("gs://in/cat.jpg"),
            FeatureType::ObjectLocalization,
            None,
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "requests": [{
                    "image": {"source": {"imageUri": "gs://in/cat.jpg"}},
                    "features": [{"type": "OBJECT_LOCALIZATION"}]
                }]
            })
        );
    }

    #[test]
    fn test_request_with_content() {
        let request = BatchAnnotateImagesRequest::single(
            &ImageInput::Content(b"abc".to_vec()),
            FeatureType::FaceDetection,
            Some(10),
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["requests"][0]["image"], json!({"content": "YWJj"}));
        assert_eq!(
            value["requests"][0]["features"][0],
            json!({"type": "FACE_DETECTION", "maxResults": 10})
        );
    }

    #[test]
    fn test_object_with_elided_zero_coordinates() {
        let value = json!({
            "mid": "/m/01yrx",
            "name": "Cat",
            "score": 0.93,
            "boundingPoly": {
                "normalizedVertices": [
                    {"y": 0.1},
                    {"x": 0.5, "y": 0.1},
                    {"x": 0.5, "y": 0.8},
                    {"y": 0.8}
                ]
            }
        });
        let annotation: LocalizedObjectAnnotation = serde_json::from_value(value).unwrap();
        let detection = annotation.to_detection();
        assert_eq!(detection.name, "Cat");
        assert_eq!(detection.vertices[0], (0.0, 0.1));
        assert_eq!(detection.vertices[3], (0.0, 0.8));
    }

    #[test]
    fn test_face_to_detection() {
        let value = json!({
            "boundingPoly": {"vertices": [
                {"x": 10, "y": 20}, {"x": 110, "y": 20}, {"x": 110, "y": 140}, {"x": 10, "y": 140}
            ]},
            "detectionConfidence": 0.98,
            "joyLikelihood": "VERY_LIKELY",
            "sorrowLikelihood": "VERY_UNLIKELY",
            "angerLikelihood": "UNLIKELY",
            "surpriseLikelihood": "POSSIBLE"
        });
        let face: FaceAnnotation = serde_json::from_value(value).unwrap();
        let detection = face.to_detection();
        assert_eq!(detection.joy, Likelihood::VeryLikely);
        assert_eq!(detection.anger, Likelihood::Unlikely);
        assert_eq!(detection.surprise, Likelihood::Possible);
        assert_eq!(detection.vertices[2], (110.0, 140.0));
    }

    #[test]
    fn test_face_accepts_numeric_likelihoods() {
        let value = json!({
            "boundingPoly": {"vertices": [{"x": 1, "y": 2}, {"x": 5, "y": 2}, {"x": 5, "y": 8}, {"x": 1, "y": 8}]},
            "joyLikelihood": 5,
            "angerLikelihood": 4,
            "surpriseLikelihood": 42
        });
        let detection = serde_json::from_value::<FaceAnnotation>(value).unwrap().to_detection();
        assert_eq!(detection.joy, Likelihood::VeryLikely);
        assert_eq!(detection.anger, Likelihood::Likely);
        assert_eq!(detection.surprise, Likelihood::Unknown);
        assert_eq!(detection.emotion_label(), "JOY - ANGER");
    }

    #[test]
    fn test_empty_response_means_nothing_detected() {
        let response: AnnotateImageResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.localized_object_annotations.is_empty());
        assert!(response.face_annotations.is_empty());
        assert!(response.error.is_none());
    }
}
